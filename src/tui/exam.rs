//! Full-screen exam session: instructions, the timed question interface with
//! palette and section tabs, confirmation modals, and the post-submission
//! review screen.

use anyhow::Result;
use crossterm::{
    event::{self, poll, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};

use examsim::bank::Exam;
use examsim::config::Config;
use examsim::engine::{AttemptState, Countdown, QuestionStatus, TimerEvent};
use examsim::store::ExamResult;

pub enum SessionOutcome {
    Submitted(ExamResult),
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Blocking instructions screen; the clock does not run yet.
    Instructions,
    Exam,
    ConfirmSubmit,
    ConfirmQuit,
    /// Post-submission breakdown screen.
    Review,
}

struct Session {
    attempt: AttemptState,
    clock: Countdown,
    phase: Phase,
    palette_visible: bool,
    status: Option<String>,
    result: Option<ExamResult>,
}

pub async fn run_session(exam: Exam, config: &Config) -> Result<SessionOutcome> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = run_exam_app(&mut terminal, exam, config);

    // Restore terminal; an abandoned session takes its clock down with it
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn run_exam_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    exam: Exam,
    config: &Config,
) -> Result<SessionOutcome> {
    let clock = Countdown::new(exam.duration_secs(), config.settings.low_time_warning_secs);
    let mut session = Session {
        attempt: AttemptState::new(exam),
        clock,
        phase: Phase::Instructions,
        palette_visible: config.settings.palette_visible,
        status: None,
        result: None,
    };

    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw(f, &session))?;

        if poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match session.phase {
                    Phase::Instructions => match key.code {
                        KeyCode::Enter => {
                            session.phase = Phase::Exam;
                            last_tick = Instant::now();
                        }
                        KeyCode::Char('q') | KeyCode::Esc => {
                            return Ok(SessionOutcome::Abandoned);
                        }
                        _ => {}
                    },
                    Phase::Exam => handle_exam_key(&mut session, key.code),
                    Phase::ConfirmSubmit => match key.code {
                        KeyCode::Char('y') | KeyCode::Enter => submit(&mut session),
                        KeyCode::Char('n') | KeyCode::Esc => session.phase = Phase::Exam,
                        _ => {}
                    },
                    Phase::ConfirmQuit => match key.code {
                        KeyCode::Char('y') => return Ok(SessionOutcome::Abandoned),
                        KeyCode::Char('n') | KeyCode::Esc => session.phase = Phase::Exam,
                        _ => {}
                    },
                    Phase::Review => match key.code {
                        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Esc => {
                            if let Some(result) = session.result.take() {
                                return Ok(SessionOutcome::Submitted(result));
                            }
                        }
                        _ => {}
                    },
                }
            }
        }

        // 1 Hz clock, gated on the instructions screen being dismissed and
        // frozen once submission has produced a result.
        let ticking = matches!(
            session.phase,
            Phase::Exam | Phase::ConfirmSubmit | Phase::ConfirmQuit
        );
        if ticking {
            while last_tick.elapsed() >= Duration::from_secs(1) {
                last_tick += Duration::from_secs(1);
                let tick = session.clock.tick();
                session.attempt.set_remaining_secs(session.clock.remaining());
                match tick {
                    TimerEvent::Tick | TimerEvent::Finished => {}
                    TimerEvent::LowTime => {
                        let mins = session.clock.remaining() / 60;
                        session.status =
                            Some(format!("Less than {} minutes remaining!", mins + 1));
                    }
                    TimerEvent::Expired => {
                        // Time up: the auto-submit path wins over any open modal
                        submit(&mut session);
                        break;
                    }
                }
            }
        }
    }
}

/// Single submission path for both the manual confirm and timer expiry. The
/// attempt's latch makes whichever fires first the only one that counts.
fn submit(session: &mut Session) {
    if let Some(result) = session.attempt.submit() {
        session.result = Some(result);
        session.phase = Phase::Review;
    }
}

fn handle_exam_key(session: &mut Session, code: KeyCode) {
    session.status = None;
    match code {
        KeyCode::Right | KeyCode::Char('n') => session.attempt.next(),
        KeyCode::Left | KeyCode::Char('p') => session.attempt.prev(),
        KeyCode::Tab => {
            let (section_idx, _) = session.attempt.position();
            session.attempt.goto_section(section_idx + 1);
        }
        KeyCode::BackTab => {
            let (section_idx, _) = session.attempt.position();
            if section_idx > 0 {
                session.attempt.goto_section(section_idx - 1);
            }
        }
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as u8 - b'1') as usize;
            let question = session.attempt.current_question();
            if let Some(option) = question.options.get(idx) {
                let (question_id, option_id) = (question.id, option.id.clone());
                session.attempt.select_answer(question_id, &option_id);
            }
        }
        KeyCode::Char('c') => {
            let question_id = session.attempt.current_question().id;
            session.attempt.clear_answer(question_id);
        }
        KeyCode::Char('f') => {
            let question_id = session.attempt.current_question().id;
            session.attempt.toggle_flag(question_id);
        }
        KeyCode::Char('v') => session.palette_visible = !session.palette_visible,
        KeyCode::Char('s') => session.phase = Phase::ConfirmSubmit,
        KeyCode::Char('q') | KeyCode::Esc => session.phase = Phase::ConfirmQuit,
        _ => {}
    }
}

fn draw(f: &mut Frame, session: &Session) {
    match session.phase {
        Phase::Instructions => draw_instructions(f, session),
        Phase::Review => draw_review(f, session),
        _ => {
            draw_exam(f, session);
            match session.phase {
                Phase::ConfirmSubmit => draw_confirm(
                    f,
                    "Submit exam?",
                    &format!(
                        "{} of {} questions answered. Submit now? (y/n)",
                        session.attempt.answered_count(),
                        session.attempt.exam().total_questions()
                    ),
                ),
                Phase::ConfirmQuit => draw_confirm(
                    f,
                    "Abandon attempt?",
                    "Progress will be discarded and nothing saved. Quit? (y/n)",
                ),
                _ => {}
            }
        }
    }
}

fn draw_instructions(f: &mut Frame, session: &Session) {
    let exam = session.attempt.exam();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let title = Paragraph::new(exam.full_name.as_str())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let mut lines = vec![
        Line::from(exam.description.as_str()),
        Line::from(""),
        Line::from(format!(
            "Duration: {} minutes    Questions: {}    Marking: +{} / -{}",
            exam.duration_minutes,
            exam.total_questions(),
            exam.marking_scheme.correct,
            exam.marking_scheme.incorrect
        )),
        Line::from(""),
        Line::from("Sections:"),
    ];
    for section in &exam.sections {
        lines.push(Line::from(format!(
            "  {} - {} questions",
            section.name,
            section.questions.len()
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from("Keys: ←/→ or p/n move, 1-9 select option, c clear, f flag,"),
        Line::from("      Tab/Shift-Tab switch section, v toggle palette, s submit, q quit"),
        Line::from(""),
        Line::from(Span::styled(
            "The clock starts when you press Enter.",
            Style::default().fg(Color::Yellow),
        )),
    ]);

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Instructions"));
    f.render_widget(body, chunks[1]);

    let footer = Paragraph::new("Press Enter to begin, q to go back")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_exam(f: &mut Frame, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.area());

    draw_header(f, session, chunks[0]);
    draw_section_tabs(f, session, chunks[1]);

    if session.palette_visible {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(26)])
            .split(chunks[2]);
        draw_question(f, session, body[0]);
        draw_palette(f, session, body[1]);
    } else {
        draw_question(f, session, chunks[2]);
    }

    let hint = match &session.status {
        Some(status) => Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            "←/→ move | 1-9 answer | c clear | f flag | Tab section | v palette | s submit | q quit",
            Style::default().fg(Color::Gray),
        )),
    };
    f.render_widget(Paragraph::new(hint).alignment(Alignment::Center), chunks[3]);
}

fn draw_header(f: &mut Frame, session: &Session, area: Rect) {
    let exam = session.attempt.exam();
    let timer_style = if session.clock.is_low() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(22)])
        .split(area);

    let name = Paragraph::new(exam.name.as_str())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(name, halves[0]);

    let timer = Paragraph::new(session.clock.format_hms())
        .style(timer_style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Time left"));
    f.render_widget(timer, halves[1]);
}

fn draw_section_tabs(f: &mut Frame, session: &Session, area: Rect) {
    let exam = session.attempt.exam();
    let (section_idx, _) = session.attempt.position();
    let titles: Vec<Line> = exam
        .sections
        .iter()
        .map(|s| Line::from(s.name.as_str()))
        .collect();

    let tabs = Tabs::new(titles)
        .select(section_idx)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn draw_question(f: &mut Frame, session: &Session, area: Rect) {
    let section = session.attempt.current_section();
    let question = session.attempt.current_question();
    let (_, question_idx) = session.attempt.position();
    let answer = session.attempt.answer_for(question.id);

    let mut title = format!(
        "Question {} of {} - {}",
        question_idx + 1,
        section.questions.len(),
        section.name
    );
    if session.attempt.is_flagged(question.id) {
        title.push_str(" [flagged]");
    }

    let mut lines = vec![Line::from(question.prompt.as_str()), Line::from("")];
    if question.image.is_some() {
        lines.push(Line::from(Span::styled(
            "(this question references a figure)",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    for (idx, option) in question.options.iter().enumerate() {
        let selected = answer == Some(option.id.as_str());
        let marker = if selected { "(*)" } else { "( )" };
        let style = if selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(
            format!("  {} {}. {}", marker, idx + 1, option.text),
            style,
        )));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(panel, area);
}

fn draw_palette(f: &mut Frame, session: &Session, area: Rect) {
    let section = session.attempt.current_section();
    let (_, current_idx) = session.attempt.position();

    let mut lines = Vec::with_capacity(section.questions.len() + 2);
    for (idx, question) in section.questions.iter().enumerate() {
        let (symbol, color) = match session.attempt.status(question.id) {
            QuestionStatus::Answered => ("[x]", Color::Green),
            QuestionStatus::Flagged => ("[f]", Color::Yellow),
            QuestionStatus::Visited => ("[ ]", Color::White),
            QuestionStatus::NotVisited => ("[ ]", Color::DarkGray),
        };
        let cursor = if idx == current_idx { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{}{} Q{}", cursor, symbol, idx + 1),
            Style::default().fg(color),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{}/{} answered",
            session.attempt.answered_count(),
            session.attempt.exam().total_questions()
        ),
        Style::default().fg(Color::Gray),
    )));

    let palette = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Palette"));
    f.render_widget(palette, area);
}

fn draw_confirm(f: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);
    let modal = Paragraph::new(message)
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(modal, area);
}

fn draw_review(f: &mut Frame, session: &Session) {
    let Some(result) = &session.result else {
        return;
    };
    let b = &result.breakdown;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let verdict = format!("Score: {} / {}", b.score, b.max_score);
    let title = Paragraph::new(verdict)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Attempt complete"));
    f.render_widget(title, chunks[0]);

    let mut lines = vec![
        Line::from(format!(
            "{:<16} {:>8} {:>10} {:>12} {:>10} {:>10}",
            "Section", "Correct", "Incorrect", "Unattempted", "Score", "Accuracy"
        )),
        Line::from(""),
    ];
    for section in &b.sections {
        lines.push(Line::from(format!(
            "{:<16} {:>8} {:>10} {:>12} {:>6}/{:<3} {:>9.1}%",
            section.name,
            section.correct,
            section.incorrect,
            section.unattempted,
            section.score,
            section.max_score,
            section.accuracy
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{:<16} {:>8} {:>10} {:>12} {:>6}/{:<3} {:>9.1}%",
            "Total", b.correct, b.incorrect, b.unattempted, b.score, b.max_score, b.accuracy
        ),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Breakdown"));
    f.render_widget(body, chunks[1]);

    let footer = Paragraph::new("Press Enter to save and exit")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
