//! # TaskDesk Client
//!
//! Typed HTTP client for the TaskDesk API.
//!
//! Every call that needs a bearer token takes an explicit [`Session`]. Sessions
//! are created by [`ApiClient::login`] and can be kept between runs with a
//! [`SessionFile`] (`save` after login, `clear` on logout).
//!
//! ## Example
//!
//! ```no_run
//! use taskdesk_client::{ApiClient, SessionFile};
//!
//! # async fn example() -> Result<(), taskdesk_client::ClientError> {
//! let client = ApiClient::new("http://localhost:8080")?;
//! let file = SessionFile::new("/tmp/taskdesk-session.json");
//!
//! let session = match file.load()? {
//!     Some(session) => session,
//!     None => {
//!         let session = client.login("grace@example.com", "secret1").await?;
//!         file.save(&session)?;
//!         session
//!     }
//! };
//!
//! let summary = client.summary(&session).await?;
//! println!("{} open", summary.open);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod session;

pub use client::{ApiClient, Health};
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionFile};
