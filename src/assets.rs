// Asynchronous texture loading for Starfield-3D

use crate::error::{Error, Result};
use crate::scene::{TextureId, TextureKind, TextureRequest};
use std::path::Path;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// What a load task reports back, success or not.
#[derive(Debug)]
pub struct TextureOutcome {
    pub id: TextureId,
    pub kind: TextureKind,
    pub result: Result<ImageData>,
}

/// A texture that decoded successfully and is ready for upload.
#[derive(Debug)]
pub struct LoadedTexture {
    pub id: TextureId,
    pub kind: TextureKind,
    pub image: ImageData,
}

/// Reads and decodes an image file into RGBA8.
pub fn decode_texture(path: &Path) -> Result<ImageData> {
    let image = image::open(path).map_err(|source| Error::Texture {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Fire-and-forget texture loading on the tokio blocking pool.
///
/// Nothing waits on it: the render loop drains whatever has arrived before
/// each frame.
pub struct TextureLoader {
    receiver: UnboundedReceiver<TextureOutcome>,
    pending: usize,
}

impl TextureLoader {
    /// Starts one decode task per request on the current runtime.
    pub fn spawn(requests: &[TextureRequest]) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Handle::current();
        for request in requests {
            Self::spawn_one(&handle, sender.clone(), request.clone());
        }
        Self {
            receiver,
            pending: requests.len(),
        }
    }

    fn spawn_one(handle: &Handle, sender: UnboundedSender<TextureOutcome>, request: TextureRequest) {
        let TextureRequest { id, path, kind } = request;
        let task = handle.spawn_blocking(move || decode_texture(&path));
        handle.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(Error::from(e)),
            };
            // The receiver only goes away when the app is shutting down
            let _ = sender.send(TextureOutcome { id, kind, result });
        });
    }

    /// Number of requests that have not reported back yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Drains finished loads without blocking. Failures are logged and dropped,
    /// leaving the default texture in place.
    pub fn poll(&mut self) -> Vec<LoadedTexture> {
        let mut loaded = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            self.pending -= 1;
            match outcome.result {
                Ok(image) => {
                    log::debug!(
                        "Texture {:?} ready ({}x{})",
                        outcome.id,
                        image.width,
                        image.height
                    );
                    loaded.push(LoadedTexture {
                        id: outcome.id,
                        kind: outcome.kind,
                        image,
                    });
                }
                Err(e) => log::warn!("{e}; keeping the default texture"),
            }
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    impl TextureLoader {
        // Waits for the next outcome. `None` once every task has reported.
        async fn recv(&mut self) -> Option<TextureOutcome> {
            if self.pending == 0 {
                return None;
            }
            let outcome = self.receiver.recv().await;
            if outcome.is_some() {
                self.pending -= 1;
            }
            outcome
        }
    }

    fn temp_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("starfield-3d-{}-{name}", std::process::id()));
        let mut img = image::RgbaImage::new(width, height);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.save(&path).expect("write test png");
        path
    }

    #[test]
    fn decodes_png_to_rgba() {
        let path = temp_png("decode.png", 2, 3);
        let image = decode_texture(&path).expect("decode");
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(image.rgba.len(), 2 * 3 * 4);
        assert_eq!(&image.rgba[..4], &[255, 0, 0, 255]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_a_texture_error() {
        let err = decode_texture(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::Texture { .. }));
        assert!(err.to_string().contains("here.png"));
    }

    #[tokio::test]
    async fn loader_reports_every_request() {
        let good = temp_png("loader.png", 4, 4);
        let requests = vec![
            TextureRequest {
                id: TextureId(0),
                path: good.clone(),
                kind: TextureKind::Color,
            },
            TextureRequest {
                id: TextureId(1),
                path: PathBuf::from("definitely/not/here.jpg"),
                kind: TextureKind::Normal,
            },
        ];
        let mut loader = TextureLoader::spawn(&requests);
        assert_eq!(loader.pending(), 2);

        let mut outcomes = Vec::new();
        while let Some(outcome) = loader.recv().await {
            outcomes.push(outcome);
        }
        outcomes.sort_by_key(|o| o.id.0);

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(outcomes[1].kind, TextureKind::Normal);
        assert!(outcomes[1].result.is_err());
        assert_eq!(loader.pending(), 0);
        let _ = std::fs::remove_file(good);
    }

    #[tokio::test]
    async fn poll_keeps_only_successes() {
        let good = temp_png("poll.png", 1, 1);
        let requests = vec![
            TextureRequest {
                id: TextureId(3),
                path: good.clone(),
                kind: TextureKind::Color,
            },
            TextureRequest {
                id: TextureId(4),
                path: PathBuf::from("definitely/not/here.jpg"),
                kind: TextureKind::Color,
            },
        ];
        let mut loader = TextureLoader::spawn(&requests);

        let mut loaded = Vec::new();
        while loader.pending() > 0 {
            loaded.extend(loader.poll());
            tokio::task::yield_now().await;
        }

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, TextureId(3));
        let _ = std::fs::remove_file(good);
    }
}
