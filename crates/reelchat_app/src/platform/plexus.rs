//! Terminal host for the particle background.
//!
//! Each terminal cell stands for an 8x16 block of surface units, so the
//! density formula sees a pixel-like viewport. Host events come from stdin
//! commands: `p` hides, `r` shows, `s COLSxROWS` resizes, `q` quits.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::style::Print;
use crossterm::terminal::{BeginSynchronizedUpdate, ClearType, EndSynchronizedUpdate};
use crossterm::{cursor, execute, queue, terminal};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reelchat_core::plexus::{Plexus, PlexusEffect, PlexusEvent, Point, Rgba, Surface, Viewport};
use reelchat_logging::{reel_debug, reel_info};

const CELL_WIDTH: u32 = 8;
const CELL_HEIGHT: u32 = 16;
const PARTICLE_GLYPH: char = 'o';
const LINK_RAMP: [char; 5] = ['.', ':', '-', '=', '+'];
const HELP: &str = "[p]ause [r]esume [s COLSxROWS] [q]uit";

pub struct PlexusOptions {
    pub cols: u16,
    pub rows: u16,
    pub frames: Option<u64>,
    pub fps: u32,
}

pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(u32::from(cols) * CELL_WIDTH, u32::from(rows) * CELL_HEIGHT)
}

pub fn run_plexus(options: PlexusOptions) -> anyhow::Result<()> {
    let (host_tx, host_rx) = mpsc::channel();
    let mut host = HostSubscription::new(host_tx);
    let mut scheduler = FrameScheduler::new(Duration::from_secs(1) / options.fps.max(1));
    let mut plexus = Plexus::new(StdRng::from_entropy());
    let mut surface = AsciiSurface::default();
    let mut out = io::stdout();
    let _cursor = HiddenCursor::new(&mut out)?;
    let mut drawn: u64 = 0;

    let mut event = PlexusEvent::Mount(viewport_for(options.cols, options.rows));
    loop {
        let effects = plexus.handle(event, &mut surface);
        let painted = effects.contains(&PlexusEffect::RequestFrame);
        apply_effects(&effects, &mut scheduler, &mut host).context("applying plexus effects")?;
        if painted {
            drawn += 1;
            let particles = plexus.field().map_or(0, |field| field.particles().len());
            let status = format!("frame {drawn} · {particles} particles · {HELP}");
            draw_frame(&mut out, &surface, &status)?;
        }
        if options.frames.is_some_and(|limit| drawn >= limit) {
            break;
        }

        let next = match scheduler.time_until_due() {
            Some(wait) => match host_rx.recv_timeout(wait) {
                Ok(command) => Some(command),
                Err(mpsc::RecvTimeoutError::Timeout) => None,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            },
            // Suspended: nothing to draw until the host says otherwise.
            None => match host_rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };
        event = match next {
            Some(HostCommand::Event(host_event)) => host_event,
            Some(HostCommand::Quit) => break,
            None => {
                scheduler.fire();
                PlexusEvent::Frame
            }
        };
    }

    let effects = plexus.handle(PlexusEvent::Unmount, &mut surface);
    apply_effects(&effects, &mut scheduler, &mut host).context("releasing plexus")?;
    reel_info!("Plexus stopped after {} frames", drawn);
    Ok(())
}

/// Paints one frame inside a synchronized update so terminals never show a
/// half-cleared grid.
fn draw_frame(out: &mut impl Write, surface: &AsciiSurface, status: &str) -> io::Result<()> {
    queue!(
        out,
        BeginSynchronizedUpdate,
        cursor::MoveTo(0, 0),
        terminal::Clear(ClearType::All)
    )?;
    let mut row_count: u16 = 0;
    for (row, line) in surface.rows().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, cursor::MoveTo(0, row), Print(line))?;
        row_count = row.saturating_add(1);
    }
    queue!(
        out,
        cursor::MoveTo(0, row_count),
        Print(status),
        cursor::MoveToNextLine(1),
        EndSynchronizedUpdate
    )?;
    out.flush()
}

/// Hides the cursor for the lifetime of the animation.
struct HiddenCursor;

impl HiddenCursor {
    fn new(out: &mut impl Write) -> io::Result<Self> {
        execute!(out, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for HiddenCursor {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show);
    }
}

fn apply_effects(
    effects: &[PlexusEffect],
    scheduler: &mut FrameScheduler,
    host: &mut HostSubscription,
) -> io::Result<()> {
    for effect in effects {
        match effect {
            PlexusEffect::SubscribeHostEvents => host.subscribe()?,
            PlexusEffect::RequestFrame => scheduler.request(),
            PlexusEffect::CancelFrame => scheduler.cancel(),
            PlexusEffect::UnsubscribeHostEvents => host.unsubscribe(),
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostCommand {
    Event(PlexusEvent),
    Quit,
}

fn parse_command(line: &str) -> Option<HostCommand> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "p" | "pause" => Some(HostCommand::Event(PlexusEvent::VisibilityChanged {
            hidden: true,
        })),
        "r" | "resume" => Some(HostCommand::Event(PlexusEvent::VisibilityChanged {
            hidden: false,
        })),
        "q" | "quit" => Some(HostCommand::Quit),
        "s" | "size" => {
            let (cols, rows) = parts.next()?.split_once('x')?;
            let cols = cols.parse().ok()?;
            let rows = rows.parse().ok()?;
            Some(HostCommand::Event(PlexusEvent::Resize(viewport_for(cols, rows))))
        }
        _ => None,
    }
}

/// Stdin listener standing in for resize/visibility notifications.
struct HostSubscription {
    tx: mpsc::Sender<HostCommand>,
    active: Option<Arc<AtomicBool>>,
}

impl HostSubscription {
    fn new(tx: mpsc::Sender<HostCommand>) -> Self {
        Self { tx, active: None }
    }

    fn subscribe(&mut self) -> io::Result<()> {
        if self.active.is_some() {
            return Ok(());
        }
        let active = Arc::new(AtomicBool::new(true));
        let reader_active = active.clone();
        let tx = self.tx.clone();
        thread::Builder::new()
            .name("reelchat-plexus-input".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    if !reader_active.load(Ordering::Acquire) {
                        break;
                    }
                    match parse_command(&line) {
                        Some(command) => {
                            if tx.send(command).is_err() {
                                break;
                            }
                        }
                        None => reel_debug!("Ignoring plexus command {:?}", line),
                    }
                }
            })?;
        reel_debug!("Plexus host events subscribed");
        self.active = Some(active);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(active) = self.active.take() {
            active.store(false, Ordering::Release);
            reel_debug!("Plexus host events released");
        }
    }
}

/// Single outstanding frame deadline.
struct FrameScheduler {
    interval: Duration,
    due: Option<Instant>,
}

impl FrameScheduler {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            due: None,
        }
    }

    fn request(&mut self) {
        self.due = Some(Instant::now() + self.interval);
    }

    fn cancel(&mut self) {
        self.due = None;
    }

    fn fire(&mut self) {
        self.due = None;
    }

    fn time_until_due(&self) -> Option<Duration> {
        self.due
            .map(|due| due.saturating_duration_since(Instant::now()))
    }
}

/// Character-grid surface; lines never overwrite particles.
#[derive(Debug, Default)]
pub struct AsciiSurface {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
    weight: Vec<f64>,
}

impl AsciiSurface {
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().collect::<String>())
    }

    fn cell(&self, point: Point) -> Option<usize> {
        if self.cols == 0 || self.rows == 0 || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let col = ((point.x / f64::from(CELL_WIDTH)) as usize).min(self.cols - 1);
        let row = ((point.y / f64::from(CELL_HEIGHT)) as usize).min(self.rows - 1);
        Some(row * self.cols + col)
    }

    fn mark(&mut self, point: Point, glyph: char, weight: f64) {
        if let Some(index) = self.cell(point) {
            if weight > self.weight[index] {
                self.cells[index] = glyph;
                self.weight[index] = weight;
            }
        }
    }
}

impl Surface for AsciiSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.cols = viewport.width.div_ceil(CELL_WIDTH) as usize;
        self.rows = viewport.height.div_ceil(CELL_HEIGHT) as usize;
        self.cells = vec![' '; self.cols * self.rows];
        self.weight = vec![0.0; self.cols * self.rows];
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
        self.weight.fill(0.0);
    }

    fn fill_circle(&mut self, center: Point, _radius: f64, _color: Rgba) {
        // Particles outrank any link glyph.
        self.mark(center, PARTICLE_GLYPH, 2.0);
    }

    fn stroke_gradient_line(&mut self, from: Point, to: Point, start: Rgba, end: Rgba, _width: f64) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = (dx.abs() / f64::from(CELL_WIDTH))
            .max(dy.abs() / f64::from(CELL_HEIGHT))
            .ceil()
            .max(1.0) as usize
            * 2;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let alpha = start.a + (end.a - start.a) * t;
            if alpha <= 0.0 {
                continue;
            }
            let slot = ((alpha * LINK_RAMP.len() as f64) as usize).min(LINK_RAMP.len() - 1);
            let point = Point {
                x: from.x + dx * t,
                y: from.y + dy * t,
            };
            self.mark(point, LINK_RAMP[slot], alpha.min(1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelchat_core::plexus::{LINK_END, LINK_START, PARTICLE_FILL};

    #[test]
    fn viewport_scales_cells_to_units() {
        assert_eq!(viewport_for(80, 24), Viewport::new(640, 384));
    }

    #[test]
    fn commands_map_to_host_events() {
        assert_eq!(
            parse_command("p"),
            Some(HostCommand::Event(PlexusEvent::VisibilityChanged { hidden: true }))
        );
        assert_eq!(
            parse_command("resume"),
            Some(HostCommand::Event(PlexusEvent::VisibilityChanged { hidden: false }))
        );
        assert_eq!(
            parse_command("s 100x30"),
            Some(HostCommand::Event(PlexusEvent::Resize(Viewport::new(800, 480))))
        );
        assert_eq!(parse_command("q"), Some(HostCommand::Quit));
        assert_eq!(parse_command("s wide"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn surface_draws_particles_over_links() {
        let mut surface = AsciiSurface::default();
        surface.resize(Viewport::new(32, 16));
        let left = Point { x: 1.0, y: 1.0 };
        let right = Point { x: 30.0, y: 1.0 };
        surface.fill_circle(left, 1.0, PARTICLE_FILL);
        surface.stroke_gradient_line(left, right, LINK_START, LINK_END, 0.8);

        let rows: Vec<String> = surface.rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].chars().count(), 4);
        assert!(rows[0].starts_with('o'));
        assert!(rows[0][1..].chars().all(|c| LINK_RAMP.contains(&c)));

        surface.clear();
        assert_eq!(surface.rows().collect::<Vec<_>>(), vec!["    ".to_string()]);
    }

    #[test]
    fn frame_is_drawn_inside_synchronized_update() {
        let mut surface = AsciiSurface::default();
        surface.resize(Viewport::new(16, 32));
        surface.fill_circle(Point { x: 1.0, y: 20.0 }, 1.0, PARTICLE_FILL);

        let mut out = Vec::new();
        draw_frame(&mut out, &surface, "frame 1").unwrap();
        let text = String::from_utf8(out).unwrap();

        // CSI ?2026 h/l bracket the frame; rows are positioned, never scrolled.
        assert!(text.starts_with("\x1b[?2026h"));
        assert!(text.ends_with("\x1b[?2026l"));
        assert!(text.contains("\x1b[2J"));
        assert!(text.contains("\x1b[2;1Ho "));
        assert!(text.contains("\x1b[3;1Hframe 1"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn scheduler_tracks_one_deadline() {
        let mut scheduler = FrameScheduler::new(Duration::from_millis(16));
        assert_eq!(scheduler.time_until_due(), None);
        scheduler.request();
        assert!(scheduler.time_until_due().unwrap() <= Duration::from_millis(16));
        scheduler.cancel();
        assert_eq!(scheduler.time_until_due(), None);
    }
}
