// main.rs      gifview command
//
// Copyright (c) 2019-2026  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifview::block::{DisposalMethod, Document, Graphic, GraphicKind};
use gifview::{Decoder, Player};
use log::debug;
use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Write};
use std::thread;
use std::time::{Duration, Instant};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Host loop tick interval
const TICK: Duration = Duration::from_millis(10);

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        ("play", Some(matches)) => play(&mut out, matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifview")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF animation viewer")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF graphic table")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("play")
                .about("Play a GIF animation")
                .arg(Arg::with_name("file").required(true).help("input file"))
                .arg(
                    Arg::with_name("speed")
                        .long("speed")
                        .short("s")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .help("playback speed (negative to reverse)"),
                )
                .arg(
                    Arg::with_name("once")
                        .long("once")
                        .help("play without looping"),
                )
                .arg(
                    Arg::with_name("cycles")
                        .long("cycles")
                        .short("c")
                        .takes_value(true)
                        .help("number of cycles to play"),
                ),
        )
}

/// Colors for output
struct Colors {
    dflt: ColorSpec,
    bold: ColorSpec,
    red: ColorSpec,
    yellow: ColorSpec,
    cyan: ColorSpec,
    magenta: ColorSpec,
}

impl Colors {
    fn new() -> Self {
        let mut dflt = ColorSpec::new();
        dflt.set_fg(Some(Color::White));
        let mut bold = ColorSpec::new();
        bold.set_fg(Some(Color::White))
            .set_intense(true)
            .set_bold(true);
        let mut red = ColorSpec::new();
        red.set_fg(Some(Color::Red)).set_intense(true);
        let mut yellow = ColorSpec::new();
        yellow.set_fg(Some(Color::Yellow)).set_intense(true);
        let mut cyan = ColorSpec::new();
        cyan.set_fg(Some(Color::Cyan)).set_intense(true);
        let mut magenta = ColorSpec::new();
        magenta.set_fg(Some(Color::Magenta));
        Colors {
            dflt,
            bold,
            red,
            yellow,
            cyan,
            magenta,
        }
    }
}

/// Decode a GIF file
fn decode_file(path: &OsStr) -> Result<Document, Box<dyn Error>> {
    let f = BufReader::new(File::open(path)?);
    Ok(Decoder::new(f).decode()?)
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let clr = Colors::new();
    for path in matches.values_of_os("files").into_iter().flatten() {
        show_file(out, &clr, path)?;
    }
    Ok(())
}

/// Column layout of the graphic table
struct Layout {
    width: u16,
    height: u16,
    global_clr: usize,
    frame_digits: usize,
    size_digits: usize,
}

/// Show one GIF file
fn show_file(
    out: &mut StandardStream,
    clr: &Colors,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let doc = decode_file(path)?;
    let screen = doc.screen();
    let graphics = doc.graphics();
    let width = screen.screen_width();
    let height = screen.screen_height();
    let layout = Layout {
        width,
        height,
        global_clr: screen.color_table_len(),
        frame_digits: digits(graphics.len()).max(3),
        size_digits: 4.max(1 + digits(width) + digits(height)),
    };
    let mut comments = vec![];
    for c in doc.comments() {
        for l in String::from_utf8_lossy(c).split('\n') {
            let l = l.trim();
            if !l.is_empty() {
                comments.push(l.to_string());
            }
        }
    }
    out.set_color(&clr.magenta)?;
    writeln!(out, "{path:?}")?;
    out.set_color(&clr.bold)?;
    write!(out, "{}, frames: {}", doc.version(), graphics.len())?;
    match doc.loop_count() {
        Some(0) => write!(out, ", repeat: ∞")?,
        Some(c) => write!(out, ", repeat: {c}")?,
        None => (),
    }
    if comments.is_empty() {
        writeln!(out)?;
    } else {
        out.set_color(&clr.cyan)?;
        for c in comments {
            writeln!(out, "  # {c}")?;
        }
    }
    out.set_color(&clr.yellow)?;
    write!(out, " {:>w$}", "Fr#", w = layout.frame_digits)?;
    write!(out, " Kind  Delay Disp")?;
    write!(out, " {:>w$}", "Size", w = layout.size_digits)?;
    write!(out, " {:>w$}", "X,Y", w = layout.size_digits)?;
    writeln!(out, " Clrs Trn")?;
    for (n, g) in graphics.iter().enumerate() {
        show_graphic(out, clr, &layout, g, n)?;
    }
    Ok(())
}

/// Get the disposal method name
fn disposal_name(graphic: &Graphic) -> &'static str {
    match graphic.control().map(|c| c.disposal_method()) {
        None => "-",
        Some(DisposalMethod::None) => "none",
        Some(DisposalMethod::DoNotDispose) => "keep",
        Some(DisposalMethod::RestoreBackground) => "bg",
        Some(DisposalMethod::RestorePrevious) => "prev",
        Some(DisposalMethod::Undefined) => "res",
    }
}

/// Show one graphic of a GIF file
fn show_graphic(
    out: &mut StandardStream,
    clr: &Colors,
    layout: &Layout,
    graphic: &Graphic,
    number: usize,
) -> Result<(), Box<dyn Error>> {
    let (kind, interlaced, left, top, width, height, colors) =
        match &graphic.kind {
            GraphicKind::Image(img) => (
                "img",
                img.interlaced(),
                img.left(),
                img.top(),
                img.width(),
                img.height(),
                img.color_table_len(),
            ),
            GraphicKind::PlainText(txt) => (
                "txt",
                false,
                txt.left(),
                txt.top(),
                txt.width(),
                txt.height(),
                0,
            ),
        };
    out.set_color(&clr.dflt)?;
    write!(out, "{}", if interlaced { 'i' } else { ' ' })?;
    out.set_color(&clr.bold)?;
    write!(out, "{:>w$}", number, w = layout.frame_digits)?;
    out.set_color(if kind == "txt" { &clr.bold } else { &clr.dflt })?;
    write!(out, "  {kind}")?;
    let d = graphic.delay_time_cs();
    out.set_color(if d == 0 { &clr.dflt } else { &clr.bold })?;
    write!(out, " {:6.2}", f32::from(d) / 100.0)?;
    let disp = disposal_name(graphic);
    out.set_color(match disp {
        "none" | "-" => &clr.dflt,
        "res" => &clr.red,
        _ => &clr.bold,
    })?;
    write!(out, " {disp:>4}")?;
    if width == layout.width && height == layout.height {
        out.set_color(&clr.dflt)?;
    } else {
        out.set_color(&clr.bold)?;
    }
    let sz = format!("{width}x{height}");
    write!(out, " {:>w$}", sz, w = layout.size_digits)?;
    if left == 0 && top == 0 {
        out.set_color(&clr.dflt)?;
    } else {
        out.set_color(&clr.bold)?;
    }
    let pos = format!("{left},{top}");
    write!(out, " {:>w$}", pos, w = layout.size_digits)?;
    if colors > 0 {
        out.set_color(&clr.bold)?;
        write!(out, "  {colors:3}")?;
    } else {
        out.set_color(&clr.dflt)?;
        write!(out, " {:3}g", layout.global_clr)?;
    }
    match graphic.transparent_color() {
        Some(tc) => {
            out.set_color(&clr.bold)?;
            writeln!(out, " {tc:>3}")?;
        }
        None => {
            out.set_color(&clr.dflt)?;
            writeln!(out, " {:>3}", "-")?;
        }
    }
    Ok(())
}

/// Handle play subcommand
fn play(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let clr = Colors::new();
    let path = matches.value_of_os("file").ok_or("missing input file")?;
    let speed: f64 = matches.value_of("speed").unwrap_or("1").parse()?;
    let cycles: u32 = matches.value_of("cycles").unwrap_or("1").parse()?;
    if speed == 0.0 || !speed.is_finite() {
        return Err("speed must be a nonzero number".into());
    }
    let doc = decode_file(path)?;
    let mut player = Player::new(&doc)
        .with_speed(speed)
        .with_looping(!matches.is_present("once"));
    if player.frame_count() == 0 {
        out.set_color(&clr.red)?;
        writeln!(out, "no graphics!")?;
        return Ok(());
    }
    if speed < 0.0 {
        player.seek(player.frame_count() - 1);
    }
    debug!(
        "playing {path:?}: {} frames, {} cs cycle",
        player.frame_count(),
        player.total_cycle_time()
    );
    let start = Instant::now();
    let mut last = start;
    let mut cycles_played = CycleCounter::new(&player);
    show_step(out, &clr, &doc, &player, 0.0)?;
    while cycles_played.completed() < cycles && !is_held(&player) {
        thread::sleep(TICK);
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f64() * 100.0;
        last = now;
        let changed = player.tick(delta);
        cycles_played.advance(delta, changed);
        if changed {
            let secs = now.duration_since(start).as_secs_f64();
            show_step(out, &clr, &doc, &player, secs)?;
        }
    }
    Ok(())
}

/// Counter of animation cycles played
struct CycleCounter {
    /// Playback speed (absolute)
    speed: f64,
    /// Sum of all frame delays
    cycle_time: f64,
    /// Number of frames in a cycle
    frame_count: usize,
    /// Time played, in centiseconds
    played: f64,
    /// Frame changes (for zero-length cycles)
    steps: usize,
}

impl CycleCounter {
    fn new(player: &Player) -> Self {
        CycleCounter {
            speed: player.speed().abs(),
            cycle_time: player.total_cycle_time(),
            frame_count: player.frame_count(),
            played: 0.0,
            steps: 0,
        }
    }

    /// Account for one tick of the player
    fn advance(&mut self, delta: f64, changed: bool) {
        self.played += delta.max(0.0) * self.speed;
        if changed {
            self.steps += 1;
        }
    }

    /// Get the number of completed cycles
    fn completed(&self) -> u32 {
        let n = if self.cycle_time > 0.0 {
            (self.played / self.cycle_time) as usize
        } else {
            self.steps / self.frame_count.max(1)
        };
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

/// Check if a non-looping player has reached its end
fn is_held(player: &Player) -> bool {
    if player.speed() < 0.0 {
        !player.is_looping() && player.frame() == 0
    } else {
        player.is_finished()
    }
}

/// Show one playback step
fn show_step(
    out: &mut StandardStream,
    clr: &Colors,
    doc: &Document,
    player: &Player,
    secs: f64,
) -> Result<(), Box<dyn Error>> {
    out.set_color(&clr.dflt)?;
    write!(out, "{secs:8.2}s")?;
    out.set_color(&clr.bold)?;
    write!(out, " {:>w$}", player.frame(), w = digits(player.frame_count()))?;
    if let Some(g) = player.current(doc) {
        out.set_color(&clr.cyan)?;
        let kind = if g.image().is_some() { "img" } else { "txt" };
        write!(out, " {kind}")?;
        out.set_color(&clr.dflt)?;
        write!(out, " {:6.2}", f32::from(g.delay_time_cs()) / 100.0)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Calculate digits in a number
fn digits<T: Into<usize>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Build an animation with delays (in centiseconds)
    fn animation(delays: &[u16]) -> Document {
        let mut gif = b"GIF89a\x01\x00\x01\x00\x80\x00\x00".to_vec();
        gif.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        for delay in delays {
            let [lo, hi] = delay.to_le_bytes();
            gif.extend_from_slice(&[0x21, 0xF9, 4, 0, lo, hi, 0, 0]);
            gif.extend_from_slice(&[0x2C, 0, 0, 0, 0, 1, 0, 1, 0, 0]);
            gif.extend_from_slice(&[2, 2, 0x4C, 0x01, 0]);
        }
        gif.push(0x3B);
        Decoder::new(&gif[..]).decode().unwrap()
    }

    /// Play with fixed ticks, returning completed cycles
    fn play_ticks(delays: &[u16], ticks: usize, delta: f64) -> u32 {
        let doc = animation(delays);
        let mut player = Player::new(&doc);
        let mut counter = CycleCounter::new(&player);
        for _ in 0..ticks {
            let changed = player.tick(delta);
            counter.advance(delta, changed);
        }
        counter.completed()
    }

    #[test]
    fn animation_delays() {
        let doc = animation(&[10, 0, 0]);
        let delays: Vec<_> =
            doc.graphics().iter().map(|g| g.delay_time_cs()).collect();
        assert_eq!(delays, [10, 0, 0]);
        assert!(doc.graphics()[0].control().is_some());
    }

    #[test]
    fn single_frame() {
        assert_eq!(play_ticks(&[10], 800, 1.25), 100);
    }

    #[test]
    fn one_nonzero_delay() {
        assert_eq!(play_ticks(&[0, 10], 800, 1.25), 100);
        assert_eq!(play_ticks(&[10, 0, 0], 800, 1.25), 100);
    }

    #[test]
    fn several_delays() {
        assert_eq!(play_ticks(&[10, 20, 10], 16, 1.25), 0);
        assert_eq!(play_ticks(&[10, 20, 10], 32, 1.25), 1);
        assert_eq!(play_ticks(&[10, 20, 10], 80, 1.25), 2);
    }

    #[test]
    fn reverse_speed() {
        let doc = animation(&[10]);
        let player = Player::new(&doc).with_speed(-2.0);
        let mut counter = CycleCounter::new(&player);
        for _ in 0..20 {
            counter.advance(1.25, false);
        }
        assert_eq!(counter.completed(), 5);
    }

    #[test]
    fn zero_cycle() {
        let doc = animation(&[0, 0]);
        let mut player = Player::new(&doc);
        let mut counter = CycleCounter::new(&player);
        for _ in 0..5 {
            let changed = player.tick(1.0);
            counter.advance(1.0, changed);
        }
        assert_eq!(counter.completed(), 2);
    }
}
