//! Organization identity printed on cards and in emails

pub const ORG_NAME: &str = "4nap - Fort Napoléon";
pub const ORG_SHORT_NAME: &str = "4nap";
pub const ORG_LOCATION: &str = "La Seyne-sur-Mer, France";
pub const ORG_WEBSITE: &str = "www.4nap.fr";
pub const ORG_CONTACT_EMAIL: &str = "contact@4nap.fr";
pub const CARD_TITLE: &str = "Pass Fidélité Membre";
