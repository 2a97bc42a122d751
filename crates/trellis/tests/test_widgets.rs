//! Integration tests for the built-in widgets mounted in a tree.

#[cfg(test)]
mod tests {
    use std::{rc::Rc, time::Duration};

    use trellis::{
        MouseEvt, NodeId, NodeSpec, Rgba, Tree,
        error::Result,
        font::Font,
        geom::{Expanse, Point, Rect},
        sprite::{SpriteRegistry, SpriteSheet},
        testing::{DrawCall, RecordingGiftbox, init_tracing},
        widgets::{Bitmap, Button, ButtonState, Label, Sprite, Wrapping},
    };

    fn font() -> Result<Rc<Font>> {
        let (_, sheet) = RecordingGiftbox::create(278, 7)?;
        Ok(Rc::new(Font::fawnt_7pt(sheet)))
    }

    fn state(t: &mut Tree, id: NodeId) -> Result<ButtonState> {
        t.with_widget(id, |b: &mut Button| b.state())
    }

    #[test]
    fn button_tracks_pointer() -> Result<()> {
        init_tracing();
        let mut t = Tree::new(Expanse::new(100, 60));
        let root = t.root();
        let b = t.add_to(
            root,
            NodeSpec::new("ok")
                .size(40, 12)
                .position(10, 10)
                .interactive()
                .widget(Button::new(font()?, "ok")),
        )?;
        assert_eq!(state(&mut t, b)?, ButtonState::None);

        t.mouse_move(&mut MouseEvt::new(15, 15))?;
        assert_eq!(state(&mut t, b)?, ButtonState::Hover);
        t.mouse_down(&mut MouseEvt::new(15, 15))?;
        assert_eq!(state(&mut t, b)?, ButtonState::Active);

        // Dragging out and back in while held re-activates the button.
        t.mouse_move(&mut MouseEvt::new(80, 50))?;
        assert_eq!(state(&mut t, b)?, ButtonState::None);
        t.mouse_move(&mut MouseEvt::new(15, 15))?;
        assert_eq!(state(&mut t, b)?, ButtonState::Active);

        t.mouse_up_gesture(MouseEvt::new(15, 15))?;
        assert_eq!(state(&mut t, b)?, ButtonState::Hover);

        // Without a held press, entering only hovers.
        t.mouse_move(&mut MouseEvt::new(80, 50))?;
        t.mouse_move(&mut MouseEvt::new(15, 15))?;
        assert_eq!(state(&mut t, b)?, ButtonState::Hover);

        let (calls, mut screen) = RecordingGiftbox::create(100, 60)?;
        t.draw(&mut screen)?;
        assert_eq!(calls.fills(Rgba::GREY), vec![Rect::new(10, 10, 40, 12)]);
        let glyphs = calls
            .calls()
            .into_iter()
            .filter(|c| matches!(c, DrawCall::Concrete { .. }))
            .count();
        assert_eq!(glyphs, 2);
        Ok(())
    }

    #[test]
    fn label_relayouts_in_tree() -> Result<()> {
        let mut t = Tree::new(Expanse::new(100, 60));
        let root = t.root();
        let l = t.add_to(
            root,
            NodeSpec::new("text")
                .size(25, 40)
                .widget(Label::new(font()?, "ab cd ef").with_wrapping(Wrapping::Word)),
        )?;
        let lines = |t: &mut Tree| t.with_widget(l, |l: &mut Label| l.lines().len());
        assert_eq!(lines(&mut t)?, 2);

        t.set_width(l, 60)?;
        assert_eq!(lines(&mut t)?, 1);

        t.with_widget(l, |l: &mut Label| l.set_text("a b c d e f g h"))?;
        assert_eq!(lines(&mut t)?, 2);
        assert!(t.with_widget(l, |_: &mut Button| ()).is_err());
        Ok(())
    }

    #[test]
    fn bitmap_from_registry() -> Result<()> {
        let (_, sheet) = RecordingGiftbox::create(32, 32)?;
        let reg = SpriteRegistry::from_metadata(
            r#"{"_numSheets": 1, "ui": {"arrow": {"sheet": 0, "x": 4, "y": 2, "w": 3, "h": 5}}}"#,
            vec![sheet],
        )?;
        assert!(Bitmap::from_registry(&reg, "ui", "nope").is_err());
        let bmp = Bitmap::from_registry(&reg, "ui", "arrow")?;
        assert_eq!(bmp.size(), Expanse::new(3, 5));

        let mut t = Tree::new(Expanse::new(100, 60));
        let root = t.root();
        t.add_to(
            root,
            NodeSpec::new("arrow").size(3, 5).position(20, 30).opacity(0.5).widget(bmp),
        )?;
        let (calls, mut screen) = RecordingGiftbox::create(100, 60)?;
        t.draw(&mut screen)?;
        let drawn = calls.calls();
        let [DrawCall::Concrete { dest, blit }] = drawn.as_slice() else {
            panic!("expected one blit");
        };
        assert_eq!(*dest, Rect::new(20, 30, 3, 5));
        assert_eq!(blit.alpha, 0.5);
        assert_eq!(blit.source.map(|s| s.cover()), Some(Rect::new(4, 2, 3, 5)));
        Ok(())
    }

    #[test]
    fn sprite_animates_with_tree() -> Result<()> {
        let (_, sheet) = RecordingGiftbox::create(16, 8)?;
        let sheet = Rc::new(SpriteSheet::from_json(
            sheet,
            r#"{
                "frames": [[0, 0, 8, 8], [8, 0, 8, 8]],
                "animations": { "blink": { "frameDuration": 100, "frames": [0, 1] } }
            }"#,
        )?);
        let mut sprite = Sprite::new(sheet);
        sprite.goto_and_play("blink")?;

        let mut t = Tree::new(Expanse::new(100, 60));
        let root = t.root();
        let s = t.add_to(
            root,
            NodeSpec::new("eye").size(8, 8).visible(false).widget(sprite),
        )?;
        t.update(Duration::from_millis(100))?;
        assert_eq!(
            t.with_widget(s, |s: &mut Sprite| s.frame())?,
            Some(Rect::new(8, 0, 8, 8))
        );
        t.update(Duration::from_millis(100))?;
        assert!(t.with_widget(s, |s: &mut Sprite| s.is_stopped())?);
        assert_eq!(t.get(s)?.true_position(), Point::zero());
        Ok(())
    }
}
