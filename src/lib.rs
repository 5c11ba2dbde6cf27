//! # webext-pack
//!
//! Composes the configuration a bundling engine needs to build a browser
//! extension with three independent surfaces (popup, options page, background
//! page), and derives the two artifacts the engine does not: the packaged
//! `manifest.json` and one HTML shell per surface.
//!
//! # Composition Order
//!
//! ```text
//! 1. Profile    .env.toml         →  Profile        (NODE_ENV + all keys)
//! 2. Secrets    Profile           →  alias map      (secrets.<profile>.js, if present)
//! 3. Mode       Profile           →  BuildMode      (dev server only for development)
//! 4. Layout     webext.toml       →  entries, rules, html jobs
//! 5. Manifest   package.json +    →  ManifestTransform (template validated eagerly)
//!               src/manifest.json
//! ```
//!
//! Every fatal condition (no environment source, no `NODE_ENV`, unreadable or
//! malformed manifest template) aborts composition before anything is
//! returned. There is no partial configuration.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`env`] | Environment source parsing and profile resolution |
//! | [`secrets`] | Optional per-profile secrets module alias |
//! | [`rules`] | Asset rule set: styles, loose files, markup |
//! | [`entries`] | The three entry points and their source files |
//! | [`html`] | HTML shell jobs and template rendering with Maud |
//! | [`manifest`] | Manifest synthesis from template + package metadata |
//! | [`mode`] | Development vs production build mode |
//! | [`compose`] | Runs the stages and builds [`compose::BuildConfiguration`] |
//! | [`config`] | Layered `webext.toml` loading, validation and stock defaults |
//! | [`naming`] | `[name]`/`[ext]` output pattern expansion |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Profile Is a Value, Not Global State
//!
//! The environment mapping is resolved once into an immutable [`env::Profile`]
//! and passed by reference to each stage. Nothing is written to the process
//! environment, so composition is deterministic and testable in-process.
//!
//! ## Build Mode Is an Enum
//!
//! Development-only settings live inside [`mode::BuildMode::Development`].
//! A production build cannot carry a dev-server block by construction, and
//! the serialized configuration simply has no such keys.
//!
//! ## Template Wins
//!
//! [`manifest::synthesize`] starts from package metadata and overlays the
//! template. The template is the document the author edits by hand, so a
//! field written there is never replaced by a derived value.
//!
//! ## Order Is Part of the Contract
//!
//! Entries, rules and HTML jobs are sequences. Engines resolve rules by first
//! match and register plugins in order, so the serialized configuration keeps
//! declaration order (`serde_json` with `preserve_order`).

pub mod compose;
pub mod config;
pub mod entries;
pub mod env;
pub mod html;
pub mod manifest;
pub mod mode;
pub mod naming;
pub mod output;
pub mod rules;
pub mod secrets;

#[cfg(test)]
pub(crate) mod test_helpers;
