//! Desktop uploader that converts local images to PNG, stores them as VK
//! graffiti documents, and sends each one to the authenticated user's own
//! chat.

pub mod app;
pub mod upload;
pub mod utils;
pub mod vk;
