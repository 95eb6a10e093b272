//! Data models shared between the server and its clients

pub mod member;

pub use member::{MemberRecord, MemberRegistration, MemberStatus, QrPayload};
