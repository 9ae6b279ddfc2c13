pub mod decoders;
pub mod import;
