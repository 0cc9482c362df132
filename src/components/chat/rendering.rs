use color_eyre::eyre::Result;
use ratatui::{
  prelude::*,
  text::{Line, Span},
  widgets::*,
};
use sql_chat_theme as theme;
use sqlformat::{FormatOptions, QueryParams};

use super::Chat;
use crate::{
  components::{centered_rect, Frame},
  config::key_event_to_string,
  conversation::Role,
  mode::Mode,
};

impl Chat {
  pub(super) fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(3)])
      .split(area);

    self.render_transcript(f, chunks[0])?;
    self.render_input(f, chunks[1])?;
    self.render_query_details(f)?;
    self.render_help(f)?;

    Ok(())
  }

  pub fn transcript_lines(&self) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in &self.messages {
      let speaker_style = match message.role {
        Role::Assistant => theme::speaker_assistant(),
        Role::User => theme::speaker_user(),
      };
      lines.push(Line::from(vec![
        Span::styled(message.role.to_string(), speaker_style),
        Span::styled(format!("  {}", message.timestamp.format("%H:%M:%S")), theme::muted()),
      ]));
      for text in message.content.lines() {
        lines.push(Line::from(Span::styled(text.to_string(), theme::message_body())));
      }
      lines.push(Line::from(""));
    }

    if self.is_busy {
      let elapsed = self.turn_started.map(|t| t.elapsed().as_secs()).unwrap_or_default();
      lines.push(Line::from(vec![
        Span::styled(Role::Assistant.to_string(), theme::speaker_assistant()),
        Span::styled(format!("  thinking... {elapsed}s"), theme::muted()),
      ]));
    }

    lines
  }

  fn render_transcript(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let title = if self.is_connected { "SQL Chat" } else { "SQL Chat (not connected)" };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(if self.focused { theme::border_focused() } else { theme::border_normal() })
      .border_type(BorderType::Rounded)
      .title(title)
      .title_style(theme::title())
      .style(theme::bg_primary());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let transcript = Paragraph::new(self.transcript_lines()).wrap(Wrap { trim: false });

    // keep the newest entry in view unless the user scrolled back
    let total = u16::try_from(transcript.line_count(inner.width)).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(inner.height);
    self.scroll_back = self.scroll_back.min(max_scroll);
    let transcript = transcript.scroll((max_scroll - self.scroll_back, 0));

    f.render_widget(transcript, inner);
    Ok(())
  }

  fn render_input(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let mut block = Block::default()
      .borders(Borders::ALL)
      .border_style(if self.focused { theme::border_focused() } else { theme::border_normal() })
      .border_type(BorderType::Rounded)
      .title(if self.is_busy { "Ask (answering...)" } else { "Ask [Enter]" })
      .title_style(theme::title());
    if let Some((flash, _)) = &self.flash {
      block = block.title_bottom(Line::from(Span::styled(flash.clone(), theme::info())).alignment(Alignment::Right));
    }

    self.input.set_block(block);
    self.input.set_cursor_style(if self.focused { Style::default().add_modifier(Modifier::REVERSED) } else { Style::default() });
    f.render_widget(&self.input, area);
    Ok(())
  }

  fn render_query_details(&mut self, f: &mut Frame<'_>) -> Result<()> {
    let Some(report) = self.last_report.as_ref().filter(|_| self.show_details) else {
      return Ok(());
    };

    let area = centered_rect(80, 70, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
      .title("Query Details - [Ctrl-q] Copy SQL")
      .borders(Borders::ALL)
      .border_style(theme::border_focused())
      .border_type(BorderType::Rounded)
      .style(theme::bg_secondary());

    let formatted = sqlformat::format(&report.sql, &QueryParams::None, FormatOptions::default());

    let mut lines = vec![Line::from(Span::styled("Question", theme::header())), Line::from(report.question.clone())];
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("SQL", theme::header())));
    lines.extend(formatted.lines().map(|l| Line::from(Span::styled(l.to_string(), theme::sql()))));
    lines.push(Line::from(""));
    if report.outcome.is_failure() {
      lines.push(Line::from(Span::styled("Error", theme::header())));
      lines.push(Line::from(Span::styled(report.outcome.text().to_string(), theme::error())));
    } else {
      lines.push(Line::from(Span::styled("Result", theme::header())));
      lines.push(Line::from(report.outcome.text().to_string()));
    }

    let details = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(details, area);
    Ok(())
  }

  fn render_help(&mut self, f: &mut Frame<'_>) -> Result<()> {
    if !self.show_help {
      return Ok(());
    }

    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help_block = Block::default()
      .title("Help - any key to close")
      .borders(Borders::ALL)
      .border_style(theme::border_focused())
      .border_type(BorderType::Rounded)
      .style(theme::bg_secondary());

    let mut lines = Vec::new();
    for (mode, title) in [(Mode::Chat, "Chat"), (Mode::Settings, "Connection")] {
      lines.push(Line::from(Span::styled(title, theme::header())));
      let mut bindings: Vec<(String, String)> = self
        .config
        .keybindings
        .get(&mode)
        .map(|keymap| {
          keymap
            .iter()
            .map(|(keys, action)| {
              let keys = keys.iter().map(key_event_to_string).collect::<Vec<_>>().join(" ");
              (keys, action.to_string())
            })
            .collect()
        })
        .unwrap_or_default();
      bindings.sort();
      for (keys, action) in bindings {
        lines.push(Line::from(vec![Span::styled(format!("{keys:<14}"), theme::info()), Span::raw(action)]));
      }
      lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled("Enter - send question / connect", theme::muted())));

    f.render_widget(Paragraph::new(lines).block(help_block), area);
    Ok(())
  }
}
