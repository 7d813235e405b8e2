//! # gang-engine: chip-collection card game core
//!
//! The authoritative game model for a cooperative multi-round card game.
//! Players draw two hole cards each, then over four rounds claim numbered
//! chips from a shared middle pool (or steal them from one another) while
//! community cards are revealed. A round closes once everyone holds exactly
//! one chip for it and has marked themselves ready.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Seeded shuffling, dealing and community draws
//! - [`chips`] - Rounds and the chips generated for them
//! - [`player`] - Player and connection identities, seated player state
//! - [`state`] - The [`GameStore`](state::GameStore) and connection bindings
//! - [`actions`] - Client actions and their validation
//! - [`rounds`] - Round completion and advancement
//! - [`view`] - Per-connection projection of the store
//! - [`protocol`] - Wire messages and frame decoding
//! - [`errors`] - Error types for rejected actions and dealing
//!
//! ## Quick Start
//!
//! ```rust
//! use gang_engine::actions::Action;
//! use gang_engine::player::ConnectionId;
//! use gang_engine::state::{GameStore, Phase};
//! use gang_engine::view::project;
//!
//! let mut store = GameStore::with_seed(42);
//! let alice = ConnectionId::from("alice");
//! let bob = ConnectionId::from("bob");
//! for (conn, name) in [(&alice, "Alice"), (&bob, "Bob")] {
//!     store.connect(conn.clone());
//!     store.apply(conn, Action::JoinLobby { name: name.into() }).unwrap();
//! }
//!
//! store.apply(&alice, Action::StartGame).unwrap();
//! assert_eq!(store.phase(), Phase::Game);
//!
//! let view = project(&store, &alice);
//! assert!(view.my_hole_cards.is_some());
//! assert_eq!(view.middle_chips.len(), 2);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! Stores built with the same seed deal identical games:
//!
//! ```rust
//! use gang_engine::deck::Shuffler;
//!
//! let mut a = Shuffler::new_with_seed(7);
//! let mut b = Shuffler::new_with_seed(7);
//! assert_eq!(a.shuffle(), b.shuffle());
//! ```

pub mod actions;
pub mod cards;
pub mod chips;
pub mod deck;
pub mod errors;
pub mod player;
pub mod protocol;
pub mod rounds;
pub mod state;
pub mod view;
