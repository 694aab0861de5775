// Infrastructure implementations for tryhard.

pub mod concurrency;
pub mod config_loader;
pub mod go_parser;
pub mod printer;
pub mod source_walker;
pub mod writer;

pub use go_parser::TreeSitterGoParser;
pub use printer::SplicePrinter;
pub use writer::BackupWriter;
