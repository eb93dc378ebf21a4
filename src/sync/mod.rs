pub mod client;
pub mod codec;
pub mod commands;
pub mod server;
pub mod session;

pub use client::{CacheHooks, ClientBridge, NoHooks, ObserverCache};
pub use codec::{DEFAULT_CHUNK_BYTES, ZoneSyncMessage, chunk_payload, encode_zones, parse_zones};
pub use commands::{AdminCommand, AdminGateway, SpawnParams};
pub use server::{ObserverId, ObserverTransport, SyncServer};
pub use session::Reassembly;
