//! Request handler tying the pipeline together.
//!
//! [`Commenter::reply`] is the whole application in one call: validate and
//! encode the upload, resolve the tone, build the prompt, ask the model. It
//! takes everything it needs as arguments and keeps no state between calls,
//! so the web layer is only an adapter around it.
//!
//! ```text
//! upload ──> encode_upload ──> EncodedImage ─┐
//!                                            ├──> ReplyModel::generate ──> GeneratedReply
//! ToneSelection ──> resolve ──> build_prompt ┘
//! ```

use crate::client::ReplyModel;
use crate::encoder::encode_upload;
use crate::prompt::{ToneSelection, build_prompt};
use crate::types::{GeneratedReply, UploadedImage};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stateless reply generator over a shared model client.
#[derive(Clone)]
pub struct Commenter {
    model: Arc<dyn ReplyModel>,
}

impl Commenter {
    pub fn new(model: Arc<dyn ReplyModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn ReplyModel {
        self.model.as_ref()
    }

    /// Produce a reply for one upload and tone selection.
    ///
    /// # Errors
    ///
    /// - [`Error::Encoding`] when `upload` is `None`, empty or not an image.
    ///   The model is not called in that case.
    /// - Any model-call error from [`ReplyModel::generate`], unchanged.
    pub async fn reply(
        &self,
        upload: Option<&UploadedImage>,
        selection: &ToneSelection,
    ) -> Result<GeneratedReply> {
        let upload = upload.ok_or_else(|| Error::encoding("please upload an image first"))?;

        let image = encode_upload(upload)?;
        debug!(
            media_type = image.media_type(),
            bytes = upload.bytes.len(),
            file_name = upload.file_name.as_deref().unwrap_or("-"),
            "image encoded"
        );

        let tone = selection.resolve();
        let prompt = build_prompt(&tone);

        let started = Instant::now();
        match self.model.generate(&image, &prompt).await {
            Ok(reply) => {
                info!(
                    tone = %tone,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "reply generated"
                );
                Ok(GeneratedReply { reply, tone })
            }
            Err(e) => {
                warn!(tone = %tone, error = %e, "model call failed");
                Err(e)
            }
        }
    }
}
