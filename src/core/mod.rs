//! Core/business logic: scanning bundles, holding the app list, checking
//! running instances and launching new ones.

pub mod detector;
pub mod launcher;
pub mod registry;
pub mod scanner;

pub use detector::Detector;
pub use launcher::LaunchChain;
pub use registry::Registry;
pub use scanner::Scanner;
