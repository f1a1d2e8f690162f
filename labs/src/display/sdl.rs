use std::time::{Duration, Instant};

use image::RgbImage;
use log::debug;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::{EventPump, Sdl, VideoSubsystem};

use super::{DisplayError, Key, Result, Viewer};

/// Attach context to the `String` errors SDL returns.
trait SdlResultExt<T> {
    fn sdl_context(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> SdlResultExt<T> for std::result::Result<T, E> {
    fn sdl_context(self, context: &str) -> Result<T> {
        self.map_err(|e| DisplayError::Backend {
            context: context.to_string(),
            message: e.to_string(),
        })
    }
}

struct SdlWindow {
    title: String,
    size: (u32, u32),
    canvas: Canvas<Window>,
}

/// One native window per title, each sized to the last image shown in it.
pub struct SdlViewer {
    _context: Sdl,
    video: VideoSubsystem,
    event_pump: EventPump,
    windows: Vec<SdlWindow>,
}

impl SdlViewer {
    pub fn new() -> Result<Self> {
        let context = sdl2::init().sdl_context("SDL init failed")?;
        let video = context.video().sdl_context("Video subsystem init failed")?;
        let event_pump = context.event_pump().sdl_context("Failed to get event pump")?;
        Ok(Self {
            _context: context,
            video,
            event_pump,
            windows: Vec::new(),
        })
    }

    fn window_for(&mut self, title: &str, size: (u32, u32)) -> Result<&mut SdlWindow> {
        let index = match self.windows.iter().position(|w| w.title == title) {
            Some(i) if self.windows[i].size == size => i,
            existing => {
                if let Some(i) = existing {
                    self.windows.remove(i);
                }
                debug!("Opening window \"{}\" ({}x{})", title, size.0, size.1);
                let window = self
                    .video
                    .window(title, size.0, size.1)
                    .position_centered()
                    .build()
                    .sdl_context("Failed to create window")?;
                let canvas = window
                    .into_canvas()
                    .build()
                    .sdl_context("Failed to create canvas")?;
                self.windows.push(SdlWindow {
                    title: title.to_string(),
                    size,
                    canvas,
                });
                self.windows.len() - 1
            }
        };
        Ok(&mut self.windows[index])
    }
}

fn to_key(keycode: Keycode) -> Key {
    match keycode {
        Keycode::Escape => Key::Escape,
        Keycode::Up => Key::Up,
        Keycode::Down => Key::Down,
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        other => {
            let name = other.name();
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                _ => Key::Other,
            }
        }
    }
}

impl Viewer for SdlViewer {
    fn show(&mut self, title: &str, image: &RgbImage) -> Result<()> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(());
        }
        let window = self.window_for(title, (width, height))?;
        let texture_creator = window.canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
            .sdl_context("Failed to create texture")?;
        texture
            .update(None, image.as_raw(), (width * 3) as usize)
            .sdl_context("Failed to update texture")?;
        window.canvas.clear();
        window
            .canvas
            .copy(&texture, None, None)
            .sdl_context("Failed to copy texture")?;
        window.canvas.present();
        Ok(())
    }

    fn wait_key(&mut self, timeout: Option<Duration>) -> Result<Option<Key>> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let event = match deadline {
                None => Some(self.event_pump.wait_event()),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        self.event_pump.poll_event()
                    } else {
                        let ms = remaining.as_millis().clamp(1, u32::MAX as u128) as u32;
                        self.event_pump.wait_event_timeout(ms)
                    }
                }
            };

            match event {
                None => return Ok(None),
                Some(Event::Quit { .. })
                | Some(Event::Window {
                    win_event: WindowEvent::Close,
                    ..
                }) => return Ok(Some(Key::Escape)),
                Some(Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                }) => return Ok(Some(to_key(keycode))),
                Some(_) => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return Ok(None);
                    }
                }
            }
        }
    }
}
