//! MCP tool request types.
//!
//! These structs define the parameters for each MCP tool exposed by the server.

use rmcp::schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCatFactRequest {
    #[schemars(description = "Maximum length of the cat fact (1-500, optional)")]
    #[schemars(range(min = 1, max = 500))]
    pub max_length: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCatFactsRequest {
    #[schemars(description = "Number of cat facts to retrieve (1-100, default: 5)")]
    #[schemars(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    #[schemars(description = "Maximum length of each cat fact (1-500, optional)")]
    #[schemars(range(min = 1, max = 500))]
    pub max_length: Option<u32>,
}
