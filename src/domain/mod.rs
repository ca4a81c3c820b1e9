mod protection_config;
// allow external `use` statements to skip `protection_config`
pub use protection_config::ProtectionConfig;
