//! Rebind Core
//!
//! This crate provides a minimal reactive data-binding engine. It implements:
//!
//! - A reactive store whose property reads are tracked and whose writes
//!   notify dependents synchronously
//! - Per-property dependency registries and watchers
//! - A template compiler for `on:`/`@`, `bind:`/`:`, `model` and
//!   `{{ expression }}` directives
//! - An in-memory render target for driving bindings without a browser
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Store, dependency registries, evaluation context, watchers
//! - `compiler`: Directive parsing, binders and compile diagnostics
//! - `dom`: Render-target traits and the in-memory document
//! - `config`: Engine options
//!
//! # Example
//!
//! ```rust
//! use rebind_core::dom::{Document, RenderNode, RenderTarget};
//! use rebind_core::reactive::make_reactive;
//! use rebind_core::{Compiler, ViewModel};
//! use serde_json::json;
//!
//! let document = Document::parse(r#"<div id="app"><input model="name"><p>{{ name }}</p></div>"#)?;
//! let vm = ViewModel::new(make_reactive(json!({ "name": "Ada" })).unwrap());
//! let _compiler = Compiler::mount(&document, "#app", vm.clone())?;
//!
//! let text = document.query_selector("p").unwrap();
//! assert_eq!(text.text_content(), "Ada");
//!
//! // Typing flows into the data, and from there into the paragraph.
//! document.query_selector("input").unwrap().input("Ada Lovelace")?;
//! assert_eq!(text.text_content(), "Ada Lovelace");
//! # Ok::<(), rebind_core::Error>(())
//! ```

pub mod compiler;
pub mod config;
pub mod dom;
pub mod error;
pub mod reactive;
pub mod value;
pub mod viewmodel;

pub use compiler::{Compiler, Diagnostic, DiagnosticKind};
pub use config::{ChangeDetection, Options};
pub use error::{Error, Result};
pub use value::Value;
pub use viewmodel::{Method, ViewModel, ViewModelBuilder};
