use tokio::sync::broadcast::{self, Sender};

use crate::types::CallbackPayload;

const BUFFER_SIZE: usize = 50;

pub fn run() -> Sender<CallbackPayload> {
    let (callback_sender, _) = broadcast::channel(BUFFER_SIZE);
    callback_sender
}
