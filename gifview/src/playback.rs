// playback.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Animation playback over a decoded document
use crate::block::{Document, Graphic};

/// Animation player.
///
/// Steps through the graphics of a [Document] according to their delay
/// times.  Time is measured in centiseconds, the unit of GIF delays.
///
/// The player holds an index cursor rather than a reference, so the document
/// is passed to [current](Player::current) when the graphic is needed.
///
/// ## Example
/// ```
/// use gifview::{Decoder, Player};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// let doc = Decoder::new(gif).decode()?;
/// let mut player = Player::new(&doc).with_speed(2.0);
/// if player.tick(1.5) {
///     // ... redraw player.current(&doc)
/// }
/// # Ok(())
/// # }
/// ```
///
/// [Document]: block/struct.Document.html
#[derive(Debug, Clone)]
pub struct Player {
    /// Delay of each frame, in centiseconds
    delays: Vec<f64>,
    /// Index of current frame
    frame: usize,
    /// Time elapsed within current frame
    elapsed: f64,
    /// Sum of all frame delays
    total_cycle_time: f64,
    /// Paused state
    paused: bool,
    /// Looping flag
    looping: bool,
    /// Playback speed multiplier (negative for reverse)
    speed: f64,
}

impl Player {
    /// Create a player for a document.
    ///
    /// The player starts on the first frame, playing and looping at normal
    /// speed.
    pub fn new(doc: &Document) -> Self {
        let delays: Vec<f64> = doc
            .graphics()
            .iter()
            .map(|g| f64::from(g.delay_time_cs()))
            .collect();
        let total_cycle_time = delays.iter().sum();
        Player {
            delays,
            frame: 0,
            elapsed: 0.0,
            total_cycle_time,
            paused: false,
            looping: true,
            speed: 1.0,
        }
    }

    /// Set the initial looping flag
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.set_looping(looping);
        self
    }

    /// Set the initial playback speed
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.set_playback_speed(speed);
        self
    }

    /// Set the initial paused state
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.set_paused(paused);
        self
    }

    /// Get the current frame index
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Get the current graphic of a document
    pub fn current<'a>(&self, doc: &'a Document) -> Option<&'a Graphic> {
        doc.graphics().get(self.frame)
    }

    /// Get the number of frames
    pub fn frame_count(&self) -> usize {
        self.delays.len()
    }

    /// Get time elapsed within the current frame
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Get the sum of all frame delays
    pub fn total_cycle_time(&self) -> f64 {
        self.total_cycle_time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Check if a non-looping animation is holding on its last frame
    pub fn is_finished(&self) -> bool {
        !self.looping && self.is_last() && self.elapsed >= self.delay()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Set playback speed multiplier (negative to play in reverse)
    pub fn set_playback_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Delay of the current frame
    fn delay(&self) -> f64 {
        self.delays.get(self.frame).copied().unwrap_or(0.0)
    }

    /// Check if the current frame is the last
    fn is_last(&self) -> bool {
        self.frame + 1 >= self.delays.len()
    }

    /// Index of the frame after the current one
    fn next_index(&self) -> usize {
        if self.is_last() { 0 } else { self.frame + 1 }
    }

    /// Index of the frame before the current one
    fn previous_index(&self) -> usize {
        match self.frame {
            0 => self.delays.len().saturating_sub(1),
            f => f - 1,
        }
    }

    /// Advance playback time.
    ///
    /// * `delta` Time since the previous tick, in centiseconds.  Negative
    ///   values are treated as zero.
    ///
    /// Returns `true` if the current frame changed.
    pub fn tick(&mut self, delta: f64) -> bool {
        if self.paused || self.delays.is_empty() {
            return false;
        }
        let step = delta.max(0.0) * self.speed;
        if !step.is_finite() {
            return false;
        }
        self.elapsed += step;
        let cycle = self.total_cycle_time;
        if self.looping && cycle > 0.0 {
            self.elapsed %= cycle;
        }
        // a zero-length cycle can only advance one frame per tick
        let max_steps = if cycle > 0.0 { self.delays.len() } else { 1 };
        let mut changed = false;
        for _ in 0..max_steps {
            if self.elapsed < 0.0 {
                if !self.looping && self.frame == 0 {
                    break;
                }
                self.frame = self.previous_index();
                self.elapsed += self.delay();
            } else {
                let delay = self.delay();
                if self.elapsed < delay || (!self.looping && self.is_last()) {
                    break;
                }
                self.elapsed -= delay;
                self.frame = self.next_index();
            }
            changed = true;
        }
        self.clamp_elapsed();
        changed
    }

    /// Keep elapsed time within the current frame
    fn clamp_elapsed(&mut self) {
        if self.elapsed < 0.0 || self.total_cycle_time <= 0.0 {
            self.elapsed = 0.0;
        } else if !self.looping && self.is_last() {
            self.elapsed = self.elapsed.min(self.delay());
        }
    }

    /// Step to the next frame, wrapping from last to first
    pub fn next_frame(&mut self) {
        if !self.delays.is_empty() {
            self.frame = self.next_index();
            self.elapsed = 0.0;
        }
    }

    /// Step to the previous frame, wrapping from first to last
    pub fn previous_frame(&mut self) {
        if !self.delays.is_empty() {
            self.frame = self.previous_index();
            self.elapsed = 0.0;
        }
    }

    /// Jump to a frame (wrapping past the end)
    pub fn seek(&mut self, frame: usize) {
        if !self.delays.is_empty() {
            self.frame = frame % self.delays.len();
            self.elapsed = 0.0;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::block::*;

    fn doc(delays: &[u16]) -> Document {
        let graphics = delays
            .iter()
            .map(|&delay_time_cs| Graphic {
                control: Some(GraphicControl {
                    delay_time_cs,
                    ..Default::default()
                }),
                kind: GraphicKind::PlainText(PlainText::default()),
            })
            .collect();
        Document {
            graphics,
            ..Default::default()
        }
    }

    #[test]
    fn new_player() {
        let p = Player::new(&doc(&[10, 20, 30]));
        assert_eq!(p.frame(), 0);
        assert_eq!(p.frame_count(), 3);
        assert_eq!(p.total_cycle_time(), 60.0);
        assert!(!p.is_paused());
        assert!(p.is_looping());
        assert_eq!(p.speed(), 1.0);
        let p = Player::new(&doc(&[10]))
            .with_looping(false)
            .with_paused(true)
            .with_speed(-0.5);
        assert!(p.is_paused());
        assert!(!p.is_looping());
        assert_eq!(p.speed(), -0.5);
    }

    #[test]
    fn equal_ticks() {
        let mut p = Player::new(&doc(&[10, 20, 30]));
        assert!(p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (1, 0.0));
        assert!(!p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (1, 10.0));
        assert!(p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (2, 0.0));
    }

    #[test]
    fn delay_ticks() {
        let mut p = Player::new(&doc(&[10, 20, 30]));
        assert!(p.tick(10.0));
        assert_eq!(p.frame(), 1);
        assert!(p.tick(20.0));
        assert_eq!(p.frame(), 2);
        assert!(p.tick(30.0));
        assert_eq!((p.frame(), p.elapsed()), (0, 0.0));
    }

    #[test]
    fn hold_last_frame() {
        let mut p = Player::new(&doc(&[10, 20, 30])).with_looping(false);
        p.tick(10.0);
        p.tick(20.0);
        assert_eq!(p.frame(), 2);
        assert!(!p.is_finished());
        for _ in 0..10 {
            assert!(!p.tick(25.0));
            assert_eq!(p.frame(), 2);
        }
        assert!(p.is_finished());
        assert_eq!(p.elapsed(), 30.0);
        p.set_looping(true);
        assert!(!p.is_finished());
        assert!(p.tick(0.0));
        assert_eq!(p.frame(), 0);
    }

    #[test]
    fn no_loop_large_tick() {
        let mut p = Player::new(&doc(&[10, 20, 30])).with_looping(false);
        assert!(p.tick(1000.0));
        assert_eq!(p.frame(), 2);
        assert!(p.is_finished());
    }

    #[test]
    fn idempotent_mutators() {
        let mut p = Player::new(&doc(&[10, 20, 30]));
        p.tick(15.0);
        let (frame, elapsed) = (p.frame(), p.elapsed());
        p.set_paused(true);
        p.set_paused(true);
        assert_eq!((p.frame(), p.elapsed()), (frame, elapsed));
        p.set_playback_speed(2.5);
        p.set_playback_speed(2.5);
        assert_eq!((p.frame(), p.elapsed()), (frame, elapsed));
        p.set_looping(false);
        p.set_looping(false);
        assert_eq!((p.frame(), p.elapsed()), (frame, elapsed));
    }

    #[test]
    fn paused() {
        let mut p = Player::new(&doc(&[10, 20])).with_paused(true);
        assert!(!p.tick(100.0));
        assert_eq!((p.frame(), p.elapsed()), (0, 0.0));
        p.set_paused(false);
        assert!(p.tick(10.0));
        assert_eq!(p.frame(), 1);
    }

    #[test]
    fn negative_delta() {
        let mut p = Player::new(&doc(&[10, 20]));
        p.tick(5.0);
        assert!(!p.tick(-50.0));
        assert_eq!((p.frame(), p.elapsed()), (0, 5.0));
        assert!(!p.tick(f64::NAN));
        assert_eq!(p.elapsed(), 5.0);
    }

    #[test]
    fn step_frames() {
        let d = doc(&[10, 20, 30]);
        let mut p = Player::new(&d);
        p.tick(5.0);
        p.previous_frame();
        assert_eq!((p.frame(), p.elapsed()), (2, 0.0));
        p.next_frame();
        assert_eq!(p.frame(), 0);
        p.next_frame();
        p.next_frame();
        assert_eq!(p.frame(), 2);
        p.previous_frame();
        assert_eq!(p.frame(), 1);
        p.seek(7);
        assert_eq!(p.frame(), 1);
        assert!(std::ptr::eq(p.current(&d).unwrap(), &d.graphics()[1]));
    }

    #[test]
    fn reverse() {
        let mut p = Player::new(&doc(&[10, 20, 30])).with_speed(-1.0);
        assert!(p.tick(5.0));
        assert_eq!((p.frame(), p.elapsed()), (2, 25.0));
        assert!(!p.tick(20.0));
        assert_eq!((p.frame(), p.elapsed()), (2, 5.0));
        assert!(p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (1, 15.0));
    }

    #[test]
    fn reverse_no_loop() {
        let mut p = Player::new(&doc(&[10, 20, 30]))
            .with_looping(false)
            .with_speed(-2.0);
        p.seek(1);
        assert!(p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (0, 0.0));
        assert!(!p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (0, 0.0));
    }

    #[test]
    fn fast_speed() {
        let mut p = Player::new(&doc(&[10, 20, 30])).with_speed(10.0);
        // 250 cs is 4 cycles plus 10
        assert!(p.tick(25.0));
        assert_eq!((p.frame(), p.elapsed()), (1, 0.0));
        // whole cycles only
        let mut p = Player::new(&doc(&[10, 20, 30]));
        assert!(!p.tick(6e9));
        assert_eq!((p.frame(), p.elapsed()), (0, 0.0));
    }

    #[test]
    fn zero_delays() {
        let mut p = Player::new(&doc(&[0, 0, 0]));
        assert_eq!(p.total_cycle_time(), 0.0);
        assert!(p.tick(1.0));
        assert_eq!(p.frame(), 1);
        assert!(p.tick(100.0));
        assert_eq!((p.frame(), p.elapsed()), (2, 0.0));
        assert!(p.tick(0.0));
        assert_eq!(p.frame(), 0);
    }

    #[test]
    fn some_zero_delays() {
        let mut p = Player::new(&doc(&[10, 0, 0, 10]));
        assert!(p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (3, 0.0));
    }

    #[test]
    fn no_control() {
        let mut d = doc(&[10, 10, 10]);
        d.graphics[1].control = None;
        let mut p = Player::new(&d);
        assert_eq!(p.total_cycle_time(), 20.0);
        assert!(p.tick(10.0));
        assert_eq!((p.frame(), p.elapsed()), (2, 0.0));
    }

    #[test]
    fn empty() {
        let d = Document::default();
        let mut p = Player::new(&d);
        assert!(!p.tick(10.0));
        p.next_frame();
        p.previous_frame();
        p.seek(3);
        assert_eq!(p.frame(), 0);
        assert_eq!(p.frame_count(), 0);
        assert!(p.current(&d).is_none());
        assert!(!p.is_finished());
    }
}
