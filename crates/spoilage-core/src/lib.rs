//! Spoilage classification and serial ingestion.
//!
//! This crate holds the policy of the system:
//!
//! - **Classification**: decide `"OK"` or `"Spoiled"` for a reading, using a
//!   trained model when one is available and a threshold rule otherwise
//! - **Model artifacts**: load the optional model once at startup
//! - **Serial ingestion**: read newline-delimited text from the sensor board
//!
//! # Quick Start
//!
//! ```no_run
//! use spoilage_core::load_classifier;
//! use spoilage_types::SensorValues;
//!
//! let classifier = load_classifier("models/spoilage_model.json");
//! let prediction = classifier.classify(&SensorValues::new(22.5, 40.0, 310.0, 420.0));
//! println!("{} ({})", prediction, classifier.name());
//! ```

pub mod classifier;
pub mod error;
pub mod model;
pub mod serial;

pub use classifier::{
    Classifier, ModelClassifier, RuleClassifier, RuleThresholds, interpret_output, load_classifier,
};
pub use error::{Error, Result};
pub use model::{LinearModel, Model, ModelArtifact, ModelOutput, load_model};

/// Re-export the shared types crate.
pub use spoilage_types as types;
