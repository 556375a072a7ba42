//! Order listing.

use minishop_storefront::db::OrderRepository;

/// Print the most recent orders, newest first.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a stored order is
/// invalid.
pub async fn list(limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let orders = OrderRepository::new(&pool)
        .list_recent(i64::from(limit))
        .await?;

    #[allow(clippy::print_stdout)]
    {
        if orders.is_empty() {
            println!("No orders yet.");
        }
        for order in &orders {
            println!(
                "#{}  {}  {}  <{}>  total {}",
                order.id,
                order.created_at.format("%Y-%m-%d %H:%M"),
                order.contact.name(),
                order.contact.email(),
                order.total
            );
            for item in &order.items {
                println!(
                    "    {} x {} @ {} = {}",
                    item.quantity,
                    item.name,
                    item.unit_price,
                    item.line_total()
                );
            }
        }
    }

    Ok(())
}
