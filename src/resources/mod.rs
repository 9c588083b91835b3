pub mod client;
pub mod types;

pub use client::ResourceClient;
pub use types::{
    ContactInfo, MarketReport, Mentor, MentorQuery, Resource, StartupField, StartupProfile,
};
