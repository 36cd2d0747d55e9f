pub mod bonus;
pub mod bootstrap;
pub mod config;
pub mod de;
pub mod endpoints;
pub mod error;
pub mod fdr;
pub mod fixture;
pub mod fpl;
pub mod gameweek;
pub mod http_client;
pub mod league;
pub mod player;
pub mod team;
pub mod user;

pub use config::{ClientConfig, Credentials};
pub use error::FplError;
pub use fpl::Fpl;
pub use http_client::{HttpSession, Transport};
