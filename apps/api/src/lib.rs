pub mod assessment;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod ingest;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod routes;
pub mod state;
