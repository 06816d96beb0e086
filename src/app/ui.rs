use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};

use crate::app::background::TileBackground;
use crate::app::models::TaskId;
use crate::app::session::{Command, Session};
use crate::app::{task_edit::*, task_list::*};

pub struct App<'a> {
    pub session: &'a mut Session,
    pub items: TaskList,
    pub task_edit_dialog_state: TaskEditDialogState,
    pub background: Option<TileBackground>,
}

impl<'a> App<'a> {
    pub fn new(session: &'a mut Session, background: bool) -> App<'a> {
        let mut app = App {
            session,
            items: TaskList::default(),
            task_edit_dialog_state: TaskEditDialogState::default(),
            background: background.then(TileBackground::default),
        };
        app.refresh();
        app
    }

    // Apply a command and bring the list selection up to date
    pub fn dispatch(&mut self, command: Command) {
        self.session.dispatch(command);
        self.refresh();
    }

    fn refresh(&mut self) {
        let projection = self.session.projection();
        self.items.update_items(&projection);
    }

    // Returns false when the user asked to quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return true;
        }

        if self.task_edit_dialog_state.dialog_active {
            // Handle input for the dialog
            match key.code {
                KeyCode::Down => self.task_edit_dialog_state.move_cursor_down(),
                KeyCode::Up => self.task_edit_dialog_state.move_cursor_up(),
                KeyCode::Left => self.task_edit_dialog_state.move_cursor_left(),
                KeyCode::Right => self.task_edit_dialog_state.move_cursor_right(),
                KeyCode::Esc => {
                    if let Some(command) = self.task_edit_dialog_state.cancel() {
                        self.dispatch(command);
                    }
                }
                KeyCode::Enter => {
                    if let Some(command) = self.task_edit_dialog_state.save_task() {
                        self.dispatch(command);
                    }
                }
                KeyCode::Backspace => {
                    self.task_edit_dialog_state.delete_char();
                    self.apply_live_query();
                }
                KeyCode::Char(to_insert) => {
                    self.task_edit_dialog_state.input(to_insert);
                    self.apply_live_query();
                }
                _ => {}
            }
            return true;
        }

        // Handle input for the task list navigation and state change
        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Down => self.items.next(),
            KeyCode::Up => self.items.previous(),
            KeyCode::Left => self.items.unselect(),
            KeyCode::Char('a') => self.task_edit_dialog_state.create_a_new_task(),
            KeyCode::Char('/') => self
                .task_edit_dialog_state
                .search(self.session.search_query()),
            KeyCode::Esc if !self.session.search_query().is_empty() => {
                self.dispatch(Command::SetSearchQuery(String::new()))
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.items.get_selected() {
                    self.dispatch(Command::BeginEdit(id));
                    if let Some(task) = self.session.store().get(id) {
                        self.task_edit_dialog_state.edit_task(task);
                    }
                }
            }
            KeyCode::Char('s') => self.dispatch_for_selected(Command::ToggleStarred),
            KeyCode::Char('x') => self.dispatch_for_selected(Command::Remove),
            KeyCode::Enter => self.dispatch_for_selected(Command::ToggleCompleted),
            _ => {}
        }
        true
    }

    fn dispatch_for_selected(&mut self, command: impl FnOnce(TaskId) -> Command) {
        if let Some(id) = self.items.get_selected() {
            self.dispatch(command(id));
        }
    }

    // The search dialog filters on every keystroke
    fn apply_live_query(&mut self) {
        if let Some(command) = self.task_edit_dialog_state.live_query() {
            self.dispatch(command);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if let Some(background) = self.background.as_mut() {
            match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    background.set_pointer(Some((mouse.column, mouse.row)))
                }
                _ => {}
            }
        }
    }

    pub fn on_tick(&mut self) {
        if let Some(background) = self.background.as_mut() {
            background.tick();
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if !app.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::FocusLost => {
                    if let Some(background) = app.background.as_mut() {
                        background.set_pointer(None);
                    }
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

// Draws the whole user interface
pub fn draw_ui(f: &mut Frame, app: &mut App) {
    let screen = f.size();
    if let Some(background) = app.background.as_mut() {
        background.resize(screen);
        f.render_widget(&*background, screen);
    }

    // Create two chunks of screen in 60-40 ratio, inset so the background shows around them
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(if app.background.is_some() { 1 } else { 0 })
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(screen);
    let pane = Style::new().bg(Color::Black).fg(Color::White);

    // DRAW LEFT PART
    let today = app.session.today();
    let projection = app.session.projection();
    let (list_items, row_positions) = get_list_items_ui(&projection, today);
    // The day may have rolled over since the last command, so rows can move
    app.items.update_items(&projection);
    app.items.sync_state(&row_positions);

    let title = match app.session.search_query() {
        "" => "Tasks".to_string(),
        query => format!("Tasks matching \"{query}\""),
    };
    let task_list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(pane)
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_widget(Clear, chunks[0]);
    f.render_stateful_widget(task_list, chunks[0], &mut app.items.state);

    // DRAW RIGHT PART
    f.render_widget(Clear, chunks[1]);
    if app.task_edit_dialog_state.dialog_active {
        let title = match app.task_edit_dialog_state.kind() {
            DialogKind::Add => "Add Task",
            DialogKind::Edit(_) => "Edit Task",
            DialogKind::Search => "Search",
        };
        let create_or_edit_task = Paragraph::new(get_task_edit_ui(app))
            .block(Block::new().title(title).borders(Borders::ALL))
            .style(pane);

        f.render_widget(create_or_edit_task, chunks[1]);
    } else {
        // If not editing, display statistics and instructions in vertically split layout
        let right_side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let instructions = Paragraph::new(get_instructions_ui(app))
            .block(Block::new().title("Commands").borders(Borders::ALL))
            .style(pane);

        let statistics = Paragraph::new(get_statistics_ui(app.session.stats()))
            .block(Block::new().title("Statistics").borders(Borders::ALL))
            .style(pane);

        f.render_widget(instructions, right_side[0]);
        f.render_widget(statistics, right_side[1]);
    }
}
