//! # IDS7 AI client
//!
//! Client for the AI results API of a Sectra IDS7 pathology server.
//!
//! The client authenticates with the callback token given to a registered
//! application, negotiates API and software versions with the server when it is
//! built, and then exposes typed operations to read slide metadata and to
//! create, fetch, and update analysis results.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ids7_client_ai::client::Ids7AIClient;
//! use ids7_client_ai::models::{AnalysisResult, ImageInfoOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Ids7AIClient::connect(
//!         "https://ids7.example.org/SectraPathologyServer/api/ai/v1",
//!         "callback-token",
//!         "my-app",
//!     )?;
//!
//!     let info = client.get_image_info("slide-42", &ImageInfoOptions::default())?;
//!     println!("Slide {} stained with {:?}", info.id, info.get_str("staining"));
//!
//!     let result = AnalysisResult::new().with_field("score", 0.9);
//!     let stored = client.create_results(&result)?;
//!     println!("Stored result {}", stored.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - The [`Ids7AIClient`](client::Ids7AIClient) and its builder
//! - [`models`] - Records sent to and returned by the server
//!
//! Errors are reported as [`Ids7Error`](ids7_client_core::Ids7Error).

pub mod client;
pub mod models;

pub use client::Ids7AIClient;
pub use ids7_client_core::{Ids7Error, Ids7Result};
