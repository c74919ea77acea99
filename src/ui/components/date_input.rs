use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

/// Date field typed as JJ/MM/AAAA, one part at a time.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Day,
            current_date_input: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.date_part = DatePart::Day;
        self.current_date_input.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Day => DatePart::Month,
            DatePart::Month => DatePart::Year,
            DatePart::Year => DatePart::Day,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Day => DatePart::Year,
            DatePart::Month => DatePart::Day,
            DatePart::Year => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    fn part_width(&self) -> usize {
        match self.date_part {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_date_input.push(c);
                if self.current_date_input.len() < self.part_width() {
                    return;
                }

                if let Ok(value) = self.current_date_input.parse::<u32>() {
                    let candidate = match self.date_part {
                        DatePart::Day => self.date.with_day(value),
                        // Clamp the day so 31/01 -> 02 lands on the last day of February
                        DatePart::Month => clamp_day(self.date.year(), value, self.date.day()),
                        DatePart::Year => clamp_day(value as i32, self.date.month(), self.date.day()),
                    };
                    if let Some(date) = candidate {
                        self.date = date;
                    }
                }
                self.current_date_input.clear();
                self.next_date_part();
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    /// Value as stored on the bill.
    pub fn value(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn get_display_string(&self) -> String {
        if !self.editing {
            return self.date.format("%d/%m/%Y").to_string();
        }

        let pending = if self.current_date_input.is_empty() {
            match self.date_part {
                DatePart::Day => "[JJ]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Year => "[AAAA]".to_string(),
            }
        } else {
            format!("[{}]", self.current_date_input)
        };

        let day = format!("{:02}", self.date.day());
        let month = format!("{:02}", self.date.month());
        let year = self.date.year().to_string();

        match self.date_part {
            DatePart::Day => format!("{}{}/{}/{}", day, pending, month, year),
            DatePart::Month => format!("{}/{}{}/{}", day, month, pending, year),
            DatePart::Year => format!("{}/{}/{}{}", day, month, year, pending),
        }
    }
}

fn clamp_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1900..=2100).contains(&year) {
        return None;
    }
    (1..=day).rev().find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_all_parts_sets_the_date() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2020, 6, 15).unwrap());
        state.toggle_editing();
        typed(&mut state, "01012011");

        assert_eq!(state.value(), "2011-01-01");
        assert_eq!(state.date_part, DatePart::Day);
    }

    #[test]
    fn month_change_clamps_the_day() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2021, 1, 31).unwrap());
        state.toggle_editing();
        state.handle_input(KeyCode::Right);
        typed(&mut state, "02");

        assert_eq!(state.value(), "2021-02-28");
    }

    #[test]
    fn invalid_day_is_ignored() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2021, 2, 10).unwrap());
        state.toggle_editing();
        typed(&mut state, "30");

        assert_eq!(state.value(), "2021-02-10");
    }

    #[test]
    fn display_marks_the_part_being_edited() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(state.get_display_string(), "01/01/2011");

        state.toggle_editing();
        state.handle_input(KeyCode::Right);
        assert_eq!(state.get_display_string(), "01/01[MM]/2011");
    }
}
