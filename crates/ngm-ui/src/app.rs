//! Main application struct
//!
//! [`App`] implements [`AppCoordinator`]: it turns key presses into
//! [`Message`]s for the current [`Mode`], drives the [`Tree`] and runs the
//! multi-repository actions through the [`TaskRunner`].
//!
//! Slow work (refreshing every repository, committing) is queued and only
//! started from [`AppCoordinator::tick`] once a frame has been drawn, so the
//! status bar shows what is happening while git runs.

use crate::renderer::AppLayout;
use crate::tree::Tree;
use crate::widgets::{CommitEditor, CommitOutcome, CommitResults, CommitView, HelpView, StatusBar, TreeView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ngm_core::{AppCoordinator, Message, Theme};
use ngm_git::discovery::relative;
use ngm_git::{fetch_all, GitBackend, NoopObserver, TaskRunner};
use ratatui::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// What the content area currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Help,
    /// Editing a commit message
    Commit,
    /// Per-repository commit report
    CommitResults,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Browse => "BROWSE",
            Mode::Help => "HELP",
            Mode::Commit => "COMMIT",
            Mode::CommitResults => "RESULTS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Refresh,
    Commit(String),
}

/// Main application state
pub struct App {
    theme: Theme,
    tree: Tree,
    backend: Arc<dyn GitBackend>,
    runner: TaskRunner,
    nerd_font: bool,
    mode: Mode,
    editor: CommitEditor,
    outcomes: Vec<CommitOutcome>,
    pending: Option<Pending>,
    /// A frame was drawn since `pending` was queued
    drawn: bool,
    /// Last failed action, shown until the next one
    error: Option<String>,
    should_quit: bool,
}

impl App {
    /// Fetch every repository in `repos` (absolute paths) and build the tree
    pub fn new(
        root: impl Into<PathBuf>,
        repos: &[PathBuf],
        backend: Arc<dyn GitBackend>,
        runner: TaskRunner,
        theme: Theme,
    ) -> Self {
        let fetched = fetch_all(&runner, Arc::clone(&backend), repos, Arc::new(NoopObserver));
        let failed = fetched.iter().filter(|(_, r)| r.is_err()).count();
        tracing::info!(repos = repos.len(), failed, "loaded repositories");

        App {
            theme,
            tree: Tree::new(root, fetched),
            backend,
            runner,
            nerd_font: false,
            mode: Mode::Browse,
            editor: CommitEditor::new(),
            outcomes: Vec::new(),
            pending: None,
            drawn: false,
            error: None,
            should_quit: false,
        }
    }

    /// Use nerd-font glyphs in the tree
    #[must_use]
    pub fn nerd_font(mut self, enabled: bool) -> Self {
        self.nerd_font = enabled;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn editor(&self) -> &CommitEditor {
        &self.editor
    }

    pub fn outcomes(&self) -> &[CommitOutcome] {
        &self.outcomes
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn status_left(&self) -> &'static str {
        match self.pending {
            Some(Pending::Refresh) => "REFRESHING",
            _ => self.mode.label(),
        }
    }

    pub fn status_center(&self) -> String {
        let repos = self.tree.repos().len();
        let noun = if repos == 1 { "repository" } else { "repositories" };
        if self.tree.is_empty() {
            return format!("0/0 · {repos} {noun}");
        }
        format!(
            "{}/{} · {} {}",
            self.tree.cursor() + 1,
            self.tree.len(),
            repos,
            noun
        )
    }

    pub fn status_right(&self) -> &'static str {
        match self.mode {
            Mode::Browse => "h:help q:quit",
            Mode::Help => "h:back q:quit",
            Mode::Commit => "Ctrl+S:commit Esc:cancel",
            Mode::CommitResults => "any key:continue",
        }
    }

    /// Renders header, content for the current mode, and status bar
    pub fn render(&mut self, frame: &mut Frame) {
        let layout = AppLayout::new(frame.area());

        let header = Line::from(vec![
            Span::styled(" ngm ", self.theme.accent()),
            Span::styled(self.tree.root().display().to_string(), self.theme.muted()),
        ]);
        frame.render_widget(header, layout.header);

        match self.mode {
            Mode::Browse => {
                self.tree.set_height(layout.content.height as usize);
                let view = TreeView::new(&self.tree, &self.theme).nerd_font(self.nerd_font);
                frame.render_widget(view, layout.content);
            }
            Mode::Help => frame.render_widget(HelpView::new(&self.theme), layout.content),
            Mode::Commit => {
                let targets = self.tree.staged_repos().len();
                let view = CommitView::new(&self.editor, &self.theme, targets);
                frame.render_widget(view, layout.content);
            }
            Mode::CommitResults => {
                let view = CommitResults::new(&self.outcomes, &self.theme);
                frame.render_widget(view, layout.content);
            }
        }

        let center = self.status_center();
        let status = StatusBar::new(&self.theme)
            .left(self.status_left())
            .center(&center)
            .right(self.status_right())
            .error(self.error.as_deref());
        frame.render_widget(status, layout.status_bar);

        self.drawn = true;
    }

    /// Map a key to a message for the current mode
    fn map_key(&mut self, key: KeyEvent) -> Message {
        if let (KeyModifiers::CONTROL, KeyCode::Char('c')) = (key.modifiers, key.code) {
            return Message::Quit;
        }

        match self.mode {
            Mode::Browse => match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => Message::MoveCursor(1),
                (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => Message::MoveCursor(-1),
                (KeyModifiers::NONE, KeyCode::PageDown) => Message::PageDown,
                (KeyModifiers::NONE, KeyCode::PageUp) => Message::PageUp,
                (KeyModifiers::NONE, KeyCode::Char('g') | KeyCode::Home) => Message::Top,
                (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('G'))
                | (KeyModifiers::NONE, KeyCode::End) => Message::Bottom,
                (KeyModifiers::NONE, KeyCode::Tab | KeyCode::Char(' ') | KeyCode::Char('=')) => {
                    Message::Toggle
                }
                (KeyModifiers::NONE, KeyCode::Char('s')) => Message::Stage,
                (KeyModifiers::NONE, KeyCode::Char('u')) => Message::Unstage,
                (KeyModifiers::NONE, KeyCode::Char('c')) => Message::StartCommit,
                (KeyModifiers::NONE, KeyCode::Char('r')) => Message::Refresh,
                (KeyModifiers::NONE, KeyCode::Char('h'))
                | (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('?')) => {
                    Message::ToggleHelp
                }
                (KeyModifiers::NONE, KeyCode::Char('q')) => Message::Quit,
                _ => Message::None,
            },
            Mode::Help => match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => Message::Quit,
                (_, KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::Esc) => Message::ToggleHelp,
                _ => Message::None,
            },
            Mode::Commit => match (key.modifiers, key.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('s')) => Message::SubmitCommit,
                (_, KeyCode::Esc) => Message::CancelCommit,
                _ => {
                    self.editor.handle_key(key);
                    Message::None
                }
            },
            // Keys are ignored while the commit is still running
            Mode::CommitResults if self.pending.is_some() => Message::None,
            Mode::CommitResults => Message::CancelCommit,
        }
    }

    fn schedule(&mut self, work: Pending) {
        self.pending = Some(work);
        self.drawn = false;
    }

    /// Run queued work now, whether or not a frame was drawn
    pub fn run_pending(&mut self) {
        match self.pending.take() {
            Some(Pending::Refresh) => self.refresh_all(),
            Some(Pending::Commit(message)) => self.commit(message),
            None => {}
        }
    }

    /// Re-fetch every repository and rebuild the tree
    fn refresh_all(&mut self) {
        let paths = self.tree.repo_paths();
        let fetched = fetch_all(
            &self.runner,
            Arc::clone(&self.backend),
            &paths,
            Arc::new(NoopObserver),
        );
        let failed = fetched.iter().filter(|(_, r)| r.is_err()).count();
        tracing::info!(repos = paths.len(), failed, "refreshed repositories");
        self.tree.rebuild(fetched);
    }

    /// Commit `message` in every repository with staged changes
    fn commit(&mut self, message: String) {
        let targets = self.tree.staged_repos();
        let backend = Arc::clone(&self.backend);
        let results = self.runner.for_each_repo(
            &targets,
            move |path| backend.commit(path, &message),
            Arc::new(NoopObserver),
        );

        self.outcomes = targets
            .iter()
            .zip(results)
            .map(|(path, result)| CommitOutcome {
                path: relative(self.tree.root(), path),
                result,
            })
            .collect();
        let failed = self.outcomes.iter().filter(|o| !o.is_ok()).count();
        tracing::info!(repos = targets.len(), failed, "committed");
    }

    fn start_commit(&mut self) {
        if self.tree.staged_repos().is_empty() {
            self.error = Some("nothing staged to commit".to_string());
            return;
        }
        self.editor = CommitEditor::new().style(self.theme.base());
        self.mode = Mode::Commit;
    }

    fn submit_commit(&mut self) {
        if self.mode != Mode::Commit {
            return;
        }
        let message = self.editor.message();
        if message.is_empty() {
            self.editor.set_error("empty commit message");
            return;
        }
        self.outcomes.clear();
        self.mode = Mode::CommitResults;
        self.schedule(Pending::Commit(message));
    }

    fn cancel_commit(&mut self) {
        match self.mode {
            Mode::Commit => self.mode = Mode::Browse,
            Mode::CommitResults => {
                self.mode = Mode::Browse;
                self.schedule(Pending::Refresh);
            }
            _ => {}
        }
    }
}

impl AppCoordinator for App {
    fn theme(&self) -> &Theme {
        &self.theme
    }

    fn dispatch(&mut self, msg: Message) {
        match msg {
            Message::Batch(msgs) => {
                for msg in Message::Batch(msgs).flatten() {
                    self.dispatch(msg);
                }
            }
            Message::None => {}
            Message::Key(key) => {
                let next = self.map_key(key);
                if !next.is_none() {
                    self.dispatch(next);
                }
            }
            Message::Paste(text) => {
                if self.mode == Mode::Commit {
                    self.editor.insert_str(&text);
                }
            }
            // The layout is recomputed on every frame
            Message::Resize(..) => {}
            Message::Quit => self.should_quit = true,
            Message::ToggleHelp => {
                self.mode = match self.mode {
                    Mode::Help => Mode::Browse,
                    _ => Mode::Help,
                };
            }
            Message::SubmitCommit => self.submit_commit(),
            Message::CancelCommit => self.cancel_commit(),
            action => {
                // Tree actions only make sense while browsing
                if self.mode != Mode::Browse {
                    return;
                }
                self.error = None;
                match action {
                    Message::MoveCursor(delta) => self.tree.move_cursor(delta),
                    Message::PageUp => self.tree.page(-1),
                    Message::PageDown => self.tree.page(1),
                    Message::Top => self.tree.top(),
                    Message::Bottom => self.tree.bottom(),
                    Message::Toggle => self.tree.toggle(),
                    Message::Stage => {
                        if let Err(e) = self.tree.stage(self.backend.as_ref()) {
                            self.error = Some(e.to_string());
                        }
                    }
                    Message::Unstage => {
                        if let Err(e) = self.tree.unstage(self.backend.as_ref()) {
                            self.error = Some(e.to_string());
                        }
                    }
                    Message::Refresh => self.schedule(Pending::Refresh),
                    Message::StartCommit => self.start_commit(),
                    _ => {}
                }
            }
        }
    }

    fn tick(&mut self) {
        if self.drawn && self.pending.is_some() {
            self.run_pending();
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngm_git::testing::FakeBackend;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    const A: &str = "/work/a";
    const B: &str = "/work/b";
    const HASH: &str = "ede67606cd3cd505a02e33a7c681f792c950f14e";

    fn entry(xy: &str, path: &str) -> String {
        format!("1 {xy} N... 100644 100644 100644 {HASH} {HASH} {path}\n")
    }

    fn setup() -> (Arc<FakeBackend>, App) {
        let fake = Arc::new(FakeBackend::new());
        fake.set_status(
            A,
            &format!("# branch.head main\n{}{}", entry(".M", "src/lib.rs"), entry("A.", "new.rs")),
        );
        fake.set_status(B, &format!("# branch.head dev\n{}", entry("M.", "README.md")));

        let backend: Arc<dyn GitBackend> = fake.clone();
        let runner = TaskRunner::new(Some(2)).expect("runner");
        let repos = vec![PathBuf::from(A), PathBuf::from(B)];
        let app = App::new("/work", &repos, backend, runner, Theme::default());
        (fake, app)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.dispatch(Message::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn ctrl(app: &mut App, c: char) {
        app.dispatch(Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_navigation_keys() {
        let (_, mut app) = setup();
        assert_eq!(app.tree().len(), 2);

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.tree().cursor(), 1);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.tree().cursor(), 0);

        press(&mut app, KeyCode::Tab);
        assert!(app.tree().len() > 2);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.tree().len(), 2);

        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.tree().cursor(), 1);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.tree().cursor(), 0);
    }

    #[test]
    fn test_quit_keys() {
        let (_, mut app) = setup();
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());

        let (_, mut app) = setup();
        ctrl(&mut app, 'c');
        assert!(app.should_quit());
    }

    #[test]
    fn test_help_toggle() {
        let (_, mut app) = setup();
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.mode(), Mode::Help);

        // Tree keys do nothing on the help screen
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.tree().cursor(), 0);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), Mode::Browse);
    }

    #[test]
    fn test_stage_and_error_reporting() {
        let (fake, mut app) = setup();
        press(&mut app, KeyCode::Char('='));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(fake.calls(), vec!["stage_change /work/a src/lib.rs"]);
        assert_eq!(app.error(), None);

        fake.fail(A, "unstage_change");
        press(&mut app, KeyCode::Char('G'));
        press(&mut app, KeyCode::Char('g'));
        // Rows: repo, Unstaged (1), lib.rs, blank, Staged (1), new.rs
        app.dispatch(Message::MoveCursor(5));
        press(&mut app, KeyCode::Char('u'));
        assert!(app.error().is_some_and(|e| e.contains("scripted failure")));

        // The next action clears it
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.error(), None);
    }

    #[test]
    fn test_commit_requires_staged_changes() {
        let (fake, mut app) = setup();
        fake.set_status(A, "# branch.head main\n");
        fake.set_status(B, "# branch.head dev\n");
        app.dispatch(Message::Refresh);
        app.run_pending();

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.mode(), Mode::Browse);
        assert_eq!(app.error(), Some("nothing staged to commit"));
    }

    #[test]
    fn test_commit_flow() {
        let (fake, mut app) = setup();
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.mode(), Mode::Commit);

        ctrl(&mut app, 's');
        assert_eq!(app.mode(), Mode::Commit);
        assert_eq!(app.editor().error(), Some("empty commit message"));

        type_text(&mut app, "fix things");
        ctrl(&mut app, 's');
        assert_eq!(app.mode(), Mode::CommitResults);
        assert!(app.has_pending());

        // Keys are ignored until the commit has run
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode(), Mode::CommitResults);

        app.run_pending();
        let mut calls = fake.calls();
        calls.sort();
        assert_eq!(calls, vec!["commit /work/a fix things", "commit /work/b fix things"]);
        let reports: Vec<_> = app.outcomes().iter().map(|o| o.report().0).collect();
        assert_eq!(reports, vec!["[OK] a", "[OK] b"]);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode(), Mode::Browse);
        assert!(app.has_pending());
        app.run_pending();
        assert_eq!(app.tree().len(), 2);
    }

    #[test]
    fn test_commit_failure_is_per_repository() {
        let (fake, mut app) = setup();
        fake.fail(B, "commit");
        press(&mut app, KeyCode::Char('c'));
        app.dispatch(Message::Paste("release\r\n".into()));
        ctrl(&mut app, 's');
        app.run_pending();

        let reports: Vec<_> = app.outcomes().iter().map(|o| o.report().0).collect();
        assert_eq!(reports, vec!["[OK] a", "[ERROR] b"]);
    }

    #[test]
    fn test_escape_cancels_commit() {
        let (fake, mut app) = setup();
        press(&mut app, KeyCode::Char('c'));
        type_text(&mut app, "wip");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), Mode::Browse);
        assert!(!app.has_pending());
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_pending_work_waits_for_a_frame() {
        let (_, mut app) = setup();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).expect("terminal");

        app.dispatch(Message::Refresh);
        assert_eq!(app.status_left(), "REFRESHING");
        app.tick();
        assert!(app.has_pending());

        terminal.draw(|frame| app.render(frame)).expect("draw");
        app.tick();
        assert!(!app.has_pending());
        assert_eq!(app.status_left(), "BROWSE");
    }

    #[test]
    fn test_render_browse_screen() {
        let (_, mut app) = setup();
        let mut terminal = Terminal::new(TestBackend::new(70, 8)).expect("terminal");
        terminal.draw(|frame| app.render(frame)).expect("draw");

        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..8u16)
            .map(|y| (0..70u16).map(|x| buffer[(x, y)].symbol().to_string()).collect())
            .collect();
        assert!(rows[0].starts_with(" ngm /work"));
        assert!(rows[1].contains("✔ a  main"));
        assert!(rows[2].contains("✔ b  dev"));
        assert!(rows[7].starts_with(" BROWSE "));
        assert!(rows[7].contains("1/2 · 2 repositories"));
        assert_eq!(app.tree().height(), 6);
    }

    #[test]
    fn test_batch_dispatch() {
        let (_, mut app) = setup();
        app.dispatch(Message::batch(vec![
            Message::MoveCursor(1),
            Message::None,
            Message::batch(vec![Message::MoveCursor(1), Message::MoveCursor(-1)]),
            Message::ToggleHelp,
        ]));
        assert_eq!(app.tree().cursor(), 1);
        assert_eq!(app.mode(), Mode::Help);
    }
}
