pub mod client;
pub mod models;

pub use client::{HttpRoomClient, RoomClient, RoomClientError, RoomClientFactory};
pub use models::{Links, Room, RoomResponse, User};
