use std::{cmp::Ordering, io};

use clap::Parser;
use cursive::{
    traits::{Nameable, Resizable, Scrollable},
    views::{Dialog, DummyView, LinearLayout, TextView},
    Cursive,
};
use cursive_table_view::{TableView, TableViewItem};
use log::error;
use page_sim::{
    config::{Args, SimConfig},
    display::{write_event, write_eviction},
};
use pager::{PageRow, Process, ReplacementPolicy, RunSummary, Translator};

const TABLE_NAME: &str = "page table";
const EVENTS_NAME: &str = "events";
const STATUS_NAME: &str = "status";

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
enum Column {
    Page,
    Rights,
    Present,
    Referenced,
    Modified,
    Frame,
}

#[derive(Debug, Clone, PartialEq)]
struct Row(PageRow);

fn flag(bit: bool) -> String {
    (bit as u8).to_string()
}

impl TableViewItem<Column> for Row {
    fn to_column(&self, column: Column) -> String {
        match column {
            Column::Page => format!("[{}]", self.0.page),
            Column::Rights => self.0.rights.to_string(),
            Column::Present => flag(self.0.present),
            Column::Referenced => flag(self.0.referenced),
            Column::Modified => flag(self.0.modified),
            Column::Frame => format!("{:03X}", self.0.frame),
        }
    }

    fn cmp(&self, other: &Self, column: Column) -> Ordering
    where
        Self: Sized,
    {
        match column {
            Column::Page => self.0.page.cmp(&other.0.page),
            Column::Rights => self.0.rights.code().cmp(&other.0.rights.code()),
            Column::Present => self.0.present.cmp(&other.0.present),
            Column::Referenced => self.0.referenced.cmp(&other.0.referenced),
            Column::Modified => self.0.modified.cmp(&other.0.modified),
            Column::Frame => self.0.frame.cmp(&other.0.frame),
        }
    }
}

fn make_table(rows: Vec<Row>) -> TableView<Row, Column> {
    let mut table = TableView::<Row, Column>::new()
        .column(Column::Page, "Page", |c| c.width(6))
        .column(Column::Rights, "A", |c| c.width(3))
        .column(Column::Present, "P", |c| c.width(3))
        .column(Column::Referenced, "R", |c| c.width(3))
        .column(Column::Modified, "M", |c| c.width(3))
        .column(Column::Frame, "FRM", |c| c.width(5));
    table.set_items(rows);
    table
}

fn render<F>(write: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let mut buf = Vec::new();
    write(&mut buf).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

struct App {
    process: Process,
    translator: Translator<Box<dyn ReplacementPolicy>>,
    summary: RunSummary,
    halted: bool,
}

impl App {
    fn init(config: &SimConfig) -> Result<Self, pager::PagerError> {
        Ok(App {
            process: config.build_process()?,
            translator: Translator::new(config.policy.build()),
            summary: RunSummary::default(),
            halted: false,
        })
    }

    fn rows(&self) -> Vec<Row> {
        self.process.dump().into_iter().map(Row).collect()
    }

    fn status(&self) -> String {
        format!(
            "{} policy | reference {}/{} | {} faults, {} evictions, {} write backs, {} invalid\n\
             [n] step  [r] run  [~] log  [q] quit",
            self.translator.policy().name(),
            self.process.position(),
            self.process.references().len(),
            self.summary.faults,
            self.summary.evictions,
            self.summary.write_backs,
            self.summary.invalid,
        )
    }

    /// Run one reference and return the lines to show for it
    fn step(&mut self) -> Vec<String> {
        if self.halted {
            return Vec::new();
        }
        match self.translator.step(&mut self.process) {
            None => {
                self.halted = true;
                vec!["-- end of references --\n".to_string()]
            }
            Some(Ok(event)) => {
                self.summary.record(&event);
                let mut lines = Vec::new();
                if let Some(eviction) = event.translation().and_then(|t| t.eviction) {
                    lines.push(render(|out| write_eviction(out, &eviction)));
                }
                lines.push(render(|out| write_event(out, &event)));
                lines
            }
            Some(Err(e)) => {
                error!("Simulation aborted: {}", e);
                self.halted = true;
                vec![format!("aborted: {}\n", e)]
            }
        }
    }

    fn run(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while !self.halted {
            lines.extend(self.step());
        }
        lines
    }
}

fn refresh(s: &mut Cursive, lines: Vec<String>) {
    let (rows, status) = match s.user_data::<App>() {
        Some(app) => (app.rows(), app.status()),
        None => return,
    };
    s.call_on_name(TABLE_NAME, |view: &mut TableView<Row, Column>| {
        view.set_items(rows)
    });
    s.call_on_name(EVENTS_NAME, |view: &mut TextView| {
        for line in lines {
            view.append(line);
        }
    });
    s.call_on_name(STATUS_NAME, |view: &mut TextView| view.set_content(status));
}

fn on_step(s: &mut Cursive) {
    let lines = s.with_user_data(|app: &mut App| app.step()).unwrap_or_default();
    refresh(s, lines);
}

fn on_run(s: &mut Cursive) {
    let lines = s.with_user_data(|app: &mut App| app.run()).unwrap_or_default();
    refresh(s, lines);
}

fn main() {
    let args = Args::parse();
    let config = match SimConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load input: {}", e);
            std::process::exit(1);
        }
    };
    let app = match App::init(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to create process: {}", e);
            std::process::exit(1);
        }
    };

    cursive::logger::init();
    let mut siv = cursive::default();
    siv.add_global_callback('q', |s| s.quit());
    siv.add_global_callback('n', on_step);
    siv.add_global_callback('r', on_run);
    siv.add_global_callback('~', Cursive::toggle_debug_console);

    let table = make_table(app.rows())
        .with_name(TABLE_NAME)
        .min_size((32, 12));
    let events = TextView::new("")
        .with_name(EVENTS_NAME)
        .scrollable()
        .min_size((48, 12));
    let status = TextView::new(app.status()).with_name(STATUS_NAME);

    siv.add_layer(
        Dialog::around(
            LinearLayout::vertical()
                .child(
                    LinearLayout::horizontal()
                        .child(table)
                        .child(DummyView)
                        .child(events),
                )
                .child(status),
        )
        .title("page_sim"),
    );
    siv.set_user_data(app);
    siv.run();
}
