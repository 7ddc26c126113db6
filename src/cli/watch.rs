//! Watch command implementation - interactive TUI machine viewer.

// CLI watch uses intentional casts for display and timing
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::needless_pass_by_value
)]

use super::CliError;
use super::output::all_registers;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dcvm::{Config, DcError, Machine, QueueInterface, loader};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::fs;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the program cannot be loaded or the TUI fails.
pub(crate) fn execute(
    program: PathBuf,
    source: bool,
    inputs: Vec<i32>,
    speed: u64,
    breakpoints: Vec<u16>,
) -> Result<(), CliError> {
    let text = fs::read_to_string(&program)
        .map_err(|e| CliError::new(format!("failed to read {}: {e}", program.display())))?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    let assembled = if source {
        dcvm::asm::assemble(&lines)?
    } else {
        lines
    };

    let mut machine = Machine::new(Config::default());
    loader::load(&mut machine, &assembled, true)?;
    for addr in breakpoints {
        machine.add_breakpoint(addr);
    }

    let name = program
        .file_name()
        .map_or_else(|| "program".to_string(), |n| n.to_string_lossy().to_string());
    let app = App::new(machine, assembled, inputs, name, speed);
    run_tui(app)
}

/// App state for the TUI.
struct App {
    machine: Machine,
    io: QueueInterface,
    /// Assembled program lines, kept for reloading on reset.
    program: Vec<String>,
    /// Inputs as given on the command line, kept for reset.
    initial_inputs: Vec<i32>,
    program_name: String,
    paused: bool,
    speed_ms: u64,
    /// RAM cursor, also the breakpoint-toggle target.
    selected: u16,
    status: String,
    last_step: Instant,
}

impl App {
    fn new(
        machine: Machine,
        program: Vec<String>,
        inputs: Vec<i32>,
        program_name: String,
        speed_ms: u64,
    ) -> Self {
        Self {
            machine,
            io: QueueInterface::with_inputs(inputs.iter().copied()),
            program,
            initial_inputs: inputs,
            program_name,
            paused: true, // Start paused
            speed_ms,
            selected: 0,
            status: String::new(),
            last_step: Instant::now(),
        }
    }

    /// Execute one cycle and translate the outcome into UI state.
    fn step(&mut self) {
        self.machine.set_running(true);
        match self.machine.cycle(&mut self.io) {
            Ok(()) => {
                if self.machine.is_running() {
                    self.status.clear();
                } else {
                    self.paused = true;
                    self.status = "machine halted".to_string();
                }
            }
            Err(DcError::Breakpoint { addr }) => {
                self.paused = true;
                self.status = format!("breakpoint at {addr}");
            }
            Err(fault) => {
                self.paused = true;
                self.machine.set_running(false);
                self.status = format!("{fault}");
            }
        }
        self.last_step = Instant::now();
    }

    /// Reload the program and re-seed the inputs. Breakpoints survive.
    fn reset(&mut self) {
        if let Err(e) = loader::load(&mut self.machine, &self.program, true) {
            self.status = format!("{e}");
            return;
        }
        self.io = QueueInterface::with_inputs(self.initial_inputs.iter().copied());
        self.paused = true;
        self.status = "reset".to_string();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.last_step = Instant::now();
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(100).max(50);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 100).min(2000);
    }

    fn move_selection(&mut self, delta: i32) {
        let max = self.machine.config().max_address();
        let next = i32::from(self.selected) + delta;
        self.selected = next.clamp(0, i32::from(max)) as u16;
    }

    fn should_auto_step(&self) -> bool {
        !self.paused && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }
}

fn run_tui(mut app: App) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    loop {
        terminal
            .draw(|f| ui(f, &app))
            .map_err(|e| CliError::new(e.to_string()))?;

        if app.should_auto_step() {
            app.step();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(50)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('n') => {
                    app.paused = true;
                    app.step();
                }
                KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
                KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
                KeyCode::Char('b') => app.machine.toggle_breakpoint(app.selected),
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') => app.reset(),
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    // Main content - RAM on the left, registers and I/O on the right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_ram(f, main_chunks[0], app);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(main_chunks[1]);

    render_registers(f, right_chunks[0], app);
    render_io(f, right_chunks[1], app);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let state = if !app.status.is_empty() {
        app.status.as_str()
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };

    let title = format!(
        " DC Machine | {} | PC {:>3} | AC {} | {} | {}ms ",
        app.program_name,
        app.machine.pc().value(),
        app.machine.ac().signed_value(),
        state,
        app.speed_ms
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_ram(f: &mut Frame, area: Rect, app: &App) {
    let machine = &app.machine;
    let config = machine.config();
    let cell_width = config.cell_width() as usize;

    let visible = (area.height as usize).saturating_sub(2).max(1);
    let len = machine.ram().len();
    let first = scroll_origin(usize::from(app.selected), visible, len);

    let mut lines: Vec<Line> = Vec::with_capacity(visible);
    for (offset, cell) in machine.ram().iter().skip(first).take(visible).enumerate() {
        let addr = (first + offset) as u16;
        let (_, arg) = config.split(cell);
        let marker = if machine.breakpoints().contains(&addr) {
            "●"
        } else {
            " "
        };
        let text = format!(
            "{marker}{addr:>4}  {:<4} {arg:>3}  {cell:0>cell_width$b}",
            machine.command_name(cell),
        );

        let mut style = Style::default();
        if machine.return_addresses().contains(&addr) {
            style = style.fg(Color::Cyan);
        }
        if addr == machine.sp().value() {
            style = style.fg(Color::Green);
        }
        if addr == machine.pc().value() {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        if addr == app.selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(Span::styled(text, style)));
    }

    let ram_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" RAM "));
    f.render_widget(ram_widget, area);
}

/// First visible RAM row so the selection stays roughly centred.
fn scroll_origin(selected: usize, visible: usize, len: usize) -> usize {
    let half = visible / 2;
    selected
        .saturating_sub(half)
        .min(len.saturating_sub(visible))
}

fn render_registers(f: &mut Frame, area: Rect, app: &App) {
    let width = app.machine.config().cell_width() as usize;
    let lines: Vec<Line> = all_registers(&app.machine)
        .iter()
        .map(|reg| {
            Line::from(format!(
                "{:<2} {:0>width$b} ({})",
                reg.name(),
                reg.value(),
                reg.signed_value(),
                width = width
            ))
        })
        .collect();

    let registers_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Registers "));
    f.render_widget(registers_widget, area);
}

fn render_io(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    let pending: Vec<String> = app.io.remaining_inputs().map(|v| v.to_string()).collect();
    lines.push(Line::from(format!("Inputs:  {}", pending.join(", "))));
    lines.push(Line::from(""));

    // Show the newest outputs that fit.
    let room = (area.height as usize).saturating_sub(4).max(1);
    let outputs = app.io.outputs();
    let skip = outputs.len().saturating_sub(room);
    for value in &outputs[skip..] {
        lines.push(Line::from(format!("Output:  {value}")));
    }

    let io_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" I/O "))
        .wrap(Wrap { trim: false });
    f.render_widget(io_widget, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.paused {
        " [q] Quit  [Space] Run  [n/→] Step  [↑/↓] Select  [b] Breakpoint  [r] Reset  [+/-] Speed "
    } else {
        " [q] Quit  [Space] Pause  [↑/↓] Select  [b] Breakpoint  [+/-] Speed "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
