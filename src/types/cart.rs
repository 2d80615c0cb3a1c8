use rust_decimal::Decimal;
use uuid::Uuid;

/// One line in a buyer's cart. `unit_price` is the catalog price at the time
/// the item was added and is only used for cart display; checkout always
/// re-reads the live product price.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
}
