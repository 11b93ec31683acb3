//! # UI Module
//!
//! User interface components and styling for the Arteria application.
//! This module will be organized into separate views as features are added.
//!
//! ## Future Organization
//! - `import_view`: recording import and corpus browsing
//! - `generator_view`: synthesis parameter panel
//! - `styles`: shared styling utilities

pub mod styles;
