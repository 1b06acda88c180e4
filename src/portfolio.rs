// src/portfolio.rs
use crate::models::{Holding, PortfolioSummary};
use crate::quotes::{QuoteError, QuoteSource};
use futures_util::future::try_join_all;

/// Fetches a current price for every holding at once and attaches it.
///
/// One request per holding, all in flight together. The first failure fails
/// the whole batch.
pub async fn attach_prices(
    source: &dyn QuoteSource,
    holdings: Vec<Holding>,
) -> Result<Vec<Holding>, QuoteError> {
    try_join_all(holdings.into_iter().map(|holding| async move {
        let price = source.fetch_price(&holding.symbol).await?;
        Ok::<_, QuoteError>(Holding {
            current_price: Some(price),
            ..holding
        })
    }))
    .await
}

impl PortfolioSummary {
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let total_value: f64 = holdings
            .iter()
            .filter_map(|h| h.current_price.map(|price| price * h.quantity))
            .sum();
        let total_investment: f64 = holdings
            .iter()
            .map(|h| h.purchase_price * h.quantity)
            .sum();
        let total_return = total_value - total_investment;
        let return_percentage = if total_investment > 0.0 {
            total_return / total_investment * 100.0
        } else {
            0.0
        };
        PortfolioSummary {
            total_investment,
            total_value,
            total_return,
            return_percentage,
        }
    }
}
