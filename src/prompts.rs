//! Response prompt templates
//!
//! Pure string building. Each prompt is wrapped in `DELIMITER` on both ends.

use crate::models::PriceQuote;

pub const DELIMITER: &str = "###";

/// Prompt for a stock price answer
pub fn finance_response_prompt(query: &str, quote: &PriceQuote) -> String {
    format!(
        "{delimiter}
You are a financial assistant. Your task is to generate a refined and informative response to the given user query.

User Query: {query}

The latest price of the relevant stock/asset is: {price}

Instructions:
- Ensure your response is a short one-liner, clear, concise, and professional.
Provide the response below and at the end ask whether the user has any further questions.
{delimiter}",
        delimiter = DELIMITER,
        query = query,
        price = quote,
    )
}

/// Prompt for a general answer
pub fn general_response_prompt(query: &str) -> String {
    format!(
        "{delimiter}
You are an AI assistant who responds to user queries in 1 or 2 short lines, then asks whether you can help the user with any queries related to the stock market.
The query is: {query}
{delimiter}",
        delimiter = DELIMITER,
        query = query,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: f64) -> PriceQuote {
        PriceQuote {
            symbol: "AAPL".to_string(),
            price,
            currency: Some("USD".to_string()),
        }
    }

    #[test]
    fn test_finance_prompt_embeds_query_and_price() {
        let prompt = finance_response_prompt("What's Apple's stock price?", &quote(190.5));

        assert!(prompt.contains("User Query: What's Apple's stock price?"));
        assert!(prompt.contains("190.50"));
        assert!(prompt.starts_with(DELIMITER));
        assert!(prompt.ends_with(DELIMITER));
        assert_eq!(prompt.matches(DELIMITER).count(), 2);
    }

    #[test]
    fn test_finance_prompt_keeps_sub_penny_price() {
        let prompt = finance_response_prompt("What's SNDL at?", &quote(0.0045));

        assert!(prompt.contains("The latest price of the relevant stock/asset is: 0.0045\n"));
    }

    #[test]
    fn test_general_prompt_embeds_query() {
        let prompt = general_response_prompt("What's the weather today?");

        assert!(prompt.contains("What's the weather today?"));
        assert!(prompt.contains("stock market"));
        assert!(prompt.starts_with(DELIMITER));
        assert!(prompt.ends_with(DELIMITER));
        assert_eq!(prompt.matches(DELIMITER).count(), 2);
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let q = "How is Nike doing?";
        assert_eq!(
            finance_response_prompt(q, &quote(101.25)),
            finance_response_prompt(q, &quote(101.25))
        );
        assert_eq!(general_response_prompt(q), general_response_prompt(q));
    }
}
