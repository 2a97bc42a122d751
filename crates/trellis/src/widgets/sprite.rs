use std::{rc::Rc, time::Duration};

use tracing::error;

use crate::{
    draw::{Blit, DrawTarget},
    error::{Error, Result},
    geom::Rect,
    sprite::SpriteSheet,
    widget::{NodeInfo, Widget},
};

/// Plays animations from a [`SpriteSheet`].
///
/// A looping animation wraps around. A non-looping one either hands over to
/// its transition animation or stops on its last frame.
pub struct Sprite {
    /// Frames and animations.
    sheet: Rc<SpriteSheet>,
    /// Paused?
    stopped: bool,
    /// Name of the current animation.
    current: Option<String>,
    /// Time spent on the current frame.
    frame_elapsed: Duration,
    /// Position within the current animation.
    frame_num: usize,
    /// Frame being shown.
    frame: Option<Rect>,
}

impl Sprite {
    /// A sprite with no animation selected.
    pub fn new(sheet: Rc<SpriteSheet>) -> Self {
        Self {
            sheet,
            stopped: false,
            current: None,
            frame_elapsed: Duration::ZERO,
            frame_num: 0,
            frame: None,
        }
    }

    /// Pause.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Resume.
    pub fn play(&mut self) {
        self.stopped = false;
    }

    /// Is playback paused?
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Name of the current animation.
    pub fn animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Position within the current animation.
    pub fn frame_num(&self) -> usize {
        self.frame_num
    }

    /// Region of the sheet being shown.
    pub fn frame(&self) -> Option<Rect> {
        self.frame
    }

    /// Jump to the first frame of an animation.
    fn goto(&mut self, name: &str) -> Result<()> {
        let anim = self
            .sheet
            .animation(name)
            .ok_or_else(|| Error::UnknownAnimation(name.into()))?;
        self.frame = anim.frames.first().and_then(|i| self.sheet.frame(*i));
        self.current = Some(name.into());
        self.frame_elapsed = Duration::ZERO;
        self.frame_num = 0;
        Ok(())
    }

    /// Start an animation from its first frame.
    pub fn goto_and_play(&mut self, name: &str) -> Result<()> {
        self.goto(name)?;
        self.play();
        Ok(())
    }

    /// Show the first frame of an animation, paused.
    pub fn goto_and_stop(&mut self, name: &str) -> Result<()> {
        self.goto(name)?;
        self.stop();
        Ok(())
    }
}

impl Widget for Sprite {
    fn update(&mut self, dt: Duration) {
        if self.stopped {
            return;
        }
        let Some(name) = self.current.clone() else {
            return;
        };
        let sheet = Rc::clone(&self.sheet);
        let Some(anim) = sheet.animation(&name) else {
            error!("sprite animation {name} is missing");
            self.stop();
            return;
        };
        self.frame_elapsed += dt;
        let per_frame = Duration::from_millis(anim.frame_duration);
        if self.frame_elapsed < per_frame {
            return;
        }
        self.frame_elapsed -= per_frame;
        let next = (self.frame_num + 1) % anim.frames.len();
        if next == 0 && !anim.looping {
            match &anim.transition {
                Some(t) => {
                    if let Err(e) = self.goto_and_play(t) {
                        error!("sprite transition from {name} failed: {e}");
                        self.stop();
                    }
                }
                None => self.stop(),
            }
            return;
        }
        self.frame_num = next;
        self.frame = sheet.frame(anim.frames[next]);
    }

    fn draw(&mut self, node: &NodeInfo, target: &mut dyn DrawTarget) -> Result<()> {
        node.paint_background(target)?;
        let Some(f) = self.frame else {
            return Ok(());
        };
        target.push_draw_concrete(
            Rect::new(0, 0, f.w, f.h),
            self.sheet.sheet(),
            Blit::region(f).with_alpha(node.opacity),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingGiftbox;

    fn sheet() -> Result<Rc<SpriteSheet>> {
        let (_, sheet) = RecordingGiftbox::create(32, 8)?;
        Ok(Rc::new(SpriteSheet::from_json(
            sheet,
            r#"{
                "frames": [[0, 0, 8, 8], [8, 0, 8, 8], [16, 0, 8, 8], [24, 0, 8, 8]],
                "animations": {
                    "idle": { "looping": true, "frameDuration": 100, "frames": [0, 1] },
                    "attack": { "frameDuration": 50, "frames": [2, 3], "transition": "idle" },
                    "die": { "frameDuration": 50, "frames": [3, 2] },
                    "broken": { "frameDuration": 50, "frames": [0], "transition": "nowhere" }
                }
            }"#,
        )?))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn loops() -> Result<()> {
        let mut s = Sprite::new(sheet()?);
        s.goto_and_play("idle")?;
        assert_eq!(s.frame(), Some(Rect::new(0, 0, 8, 8)));
        s.update(ms(60));
        assert_eq!(s.frame_num(), 0);
        s.update(ms(60));
        assert_eq!(s.frame(), Some(Rect::new(8, 0, 8, 8)));
        s.update(ms(100));
        assert_eq!(s.frame_num(), 0);
        assert!(!s.is_stopped());
        Ok(())
    }

    #[test]
    fn transitions() -> Result<()> {
        let mut s = Sprite::new(sheet()?);
        s.goto_and_play("attack")?;
        s.update(ms(50));
        assert_eq!(s.frame(), Some(Rect::new(24, 0, 8, 8)));
        s.update(ms(50));
        assert_eq!(s.animation(), Some("idle"));
        assert_eq!(s.frame(), Some(Rect::new(0, 0, 8, 8)));
        assert!(!s.is_stopped());
        Ok(())
    }

    #[test]
    fn one_shot_holds_last_frame() -> Result<()> {
        let mut s = Sprite::new(sheet()?);
        s.goto_and_play("die")?;
        s.update(ms(50));
        s.update(ms(50));
        assert!(s.is_stopped());
        assert_eq!(s.frame(), Some(Rect::new(16, 0, 8, 8)));
        s.update(ms(500));
        assert_eq!(s.frame(), Some(Rect::new(16, 0, 8, 8)));
        Ok(())
    }

    #[test]
    fn bad_names() -> Result<()> {
        let mut s = Sprite::new(sheet()?);
        assert_eq!(
            s.goto_and_play("fly"),
            Err(Error::UnknownAnimation("fly".into()))
        );
        s.update(ms(100));
        assert_eq!(s.frame(), None);

        s.goto_and_play("broken")?;
        s.update(ms(50));
        assert!(s.is_stopped());
        assert_eq!(s.animation(), Some("broken"));
        Ok(())
    }
}
