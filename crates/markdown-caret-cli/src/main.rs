use anyhow::{Context, Result, bail};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_caret_config::Config;
use markdown_caret_engine::{
    Document, LayoutOracle, MemorySink, MonospaceLayout, Navigator, Place, Rect, Selection,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

impl Key {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name.trim().to_ascii_lowercase().as_str() {
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            other => bail!("unknown key '{other}', expected up, down, left, right, home or end"),
        })
    }
}

struct Args {
    file: Option<PathBuf>,
    keys: Option<Vec<Key>>,
    at: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        file: None,
        keys: None,
        at: None,
    };
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--keys" => {
                let list = it.next().context("--keys needs a comma separated list")?;
                args.keys = Some(list.split(',').map(Key::parse).collect::<Result<_>>()?);
            }
            "--at" => args.at = Some(it.next().context("--at needs some text to find")?),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if args.file.is_none() => args.file = Some(PathBuf::from(arg)),
            _ => bail!("only one file can be opened"),
        }
    }
    Ok(args)
}

struct App {
    doc: Document,
    nav: Navigator<MonospaceLayout>,
    sink: MemorySink,
    mutations: usize,
}

impl App {
    fn new(doc: Document, config: &Config, at: Option<&str>) -> Result<Self> {
        let layout = MonospaceLayout::new(config.layout.clone());
        let nav = Navigator::with_tuning(layout, config.navigation.clone());
        let sink = match at {
            Some(needle) => {
                let anchor = doc
                    .find_text(needle)
                    .with_context(|| format!("text '{needle}' not found in document"))?;
                MemorySink::at(Selection::Caret(anchor))
            }
            None => MemorySink::new(),
        };
        Ok(Self {
            doc,
            nav,
            sink,
            mutations: 0,
        })
    }

    fn press(&mut self, key: Key) -> bool {
        let mutations = &mut self.mutations;
        let on_mutate = || {
            *mutations += 1;
            log::debug!("document grew a paragraph");
        };
        match key {
            Key::Right => self.nav.move_cursor_forward(&mut self.doc, &mut self.sink, on_mutate),
            Key::Left => self.nav.move_cursor_backward(&mut self.doc, &mut self.sink, on_mutate),
            Key::Up => self.nav.move_cursor_up(&mut self.doc, &mut self.sink, on_mutate),
            Key::Down => self.nav.move_cursor_down(&mut self.doc, &mut self.sink, on_mutate),
            Key::Home => self.nav.move_cursor_to_line_start(&self.doc, &mut self.sink),
            Key::End => self.nav.move_cursor_to_line_end(&self.doc, &mut self.sink),
        }
    }

    fn status(&self) -> String {
        let offset = self
            .nav
            .plain_offset(&self.doc, &self.sink)
            .map_or_else(|| "-".to_string(), |o| o.to_string());
        format!("{} @ {offset}", self.nav.describe(&self.doc, &self.sink))
    }

    /// Where the caret or selected unit is drawn, in cells.
    fn highlight(&self) -> Option<(Place, CellBox)> {
        let place = self.nav.place(&self.doc, &self.sink)?;
        let oracle = self.nav.oracle();
        let rect = match place {
            Place::Caret(position) => oracle.caret_rect(&self.doc, &position)?,
            Place::Selected(node) => oracle.node_rect(&self.doc, node)?,
        };
        Some((place, CellBox::from_rect(&rect, oracle)))
    }
}

#[derive(Debug, Clone, Copy)]
struct CellBox {
    row: usize,
    col: usize,
    width: usize,
}

impl CellBox {
    fn from_rect(rect: &Rect, layout: &MonospaceLayout) -> Self {
        let m = layout.metrics();
        let col = (rect.left / m.cell_width).round() as usize;
        let right = (rect.right / m.cell_width).round() as usize;
        Self {
            row: (rect.top / m.line_height).round() as usize,
            col,
            width: right.saturating_sub(col),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: markdown-caret-cli [FILE] [--keys up,down,left,right,home,end] [--at TEXT]");
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    let Some(path) = args.file.clone().or_else(|| config.document_path.clone()) else {
        eprintln!("Error: No file provided and no document_path in config");
        eprintln!("Usage: markdown-caret-cli [FILE] [--keys up,down,left,right,home,end] [--at TEXT]");
        process::exit(1);
    };
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = Document::from_markdown(&source);

    let mut app = App::new(doc, &config, args.at.as_deref())?;

    if let Some(keys) = args.keys {
        run_script(&mut app, &keys);
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Headless mode: one line per key.
fn run_script(app: &mut App, keys: &[Key]) {
    println!("start: {}", app.status());
    for key in keys {
        let moved = app.press(*key);
        let marker = if moved { "" } else { " (no move)" };
        println!("{key:?}: {}{marker}", app.status());
    }
    if app.mutations > 0 {
        println!("paragraphs added: {}", app.mutations);
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let key = match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Up => Key::Up,
                KeyCode::Down => Key::Down,
                KeyCode::Left => Key::Left,
                KeyCode::Right => Key::Right,
                KeyCode::Home => Key::Home,
                KeyCode::End => Key::End,
                _ => continue,
            };
            app.press(key);
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let rows = app.nav.oracle().render_rows(&app.doc);
    let highlight = app.highlight();
    let view_height = usize::from(chunks[0].height.saturating_sub(2)).max(1);
    let scroll = highlight
        .map(|(_, cell)| cell.row.saturating_sub(view_height - 1))
        .unwrap_or(0);

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| match highlight {
            Some((Place::Selected(_), cell)) if cell.row == i => selected_line(row, cell),
            _ => Line::from(row.clone()),
        })
        .collect();

    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Document"))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(content, chunks[0]);

    if let Some((Place::Caret(_), cell)) = highlight {
        let x = chunks[0].x + 1 + u16::try_from(cell.col).unwrap_or(u16::MAX);
        let y = chunks[0].y + 1 + u16::try_from(cell.row - scroll).unwrap_or(u16::MAX);
        f.set_cursor_position((x, y));
    }

    let help = Paragraph::new(vec![
        Line::from(app.status()),
        Line::from("q: Quit | ←/→: Character | ↑/↓: Line | Home/End: Line bounds"),
    ])
    .block(Block::default());
    f.render_widget(help, chunks[1]);
}

/// Splits `row` at display columns and highlights the selected cells.
fn selected_line(row: &str, cell: CellBox) -> Line<'static> {
    let end_col = cell.col + cell.width.max(1);
    let (mut before, mut selected, mut after) = (String::new(), String::new(), String::new());
    let mut col = 0;
    for grapheme in row.graphemes(true) {
        let target = if col < cell.col {
            &mut before
        } else if col < end_col {
            &mut selected
        } else {
            &mut after
        };
        target.push_str(grapheme);
        col += grapheme.width();
    }
    Line::from(vec![
        Span::raw(before),
        Span::styled(
            selected,
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(after),
    ])
}
