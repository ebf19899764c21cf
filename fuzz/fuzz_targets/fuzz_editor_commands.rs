#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quire_editor::{Editor, Position, Selection};

#[derive(Arbitrary, Debug)]
enum Command {
    Insert(String),
    Select { from: (u8, u16), to: (u8, u16) },
    SelectAll,
    Bold,
    Italic,
    Underline,
    Title,
    Subtitle,
    Normal,
    Align(u8),
    List(bool),
    Table(u8, u8),
    Link(String),
    Image(String),
    Rule,
    Replace(String),
    Html(String),
}

fuzz_target!(|commands: Vec<Command>| {
    let mut editor = Editor::new();
    for command in commands.into_iter().take(64) {
        match command {
            Command::Insert(text) => editor.insert_text(&text),
            Command::Select { from, to } => editor.select(Selection::new(
                Position::new(from.0.into(), from.1.into()),
                Position::new(to.0.into(), to.1.into()),
            )),
            Command::SelectAll => editor.select_all(),
            Command::Bold => editor.bold(),
            Command::Italic => editor.italic(),
            Command::Underline => editor.underline(),
            Command::Title => editor.make_title(),
            Command::Subtitle => editor.make_subtitle(),
            Command::Normal => editor.make_normal_text(),
            Command::Align(n) => match n % 3 {
                0 => editor.align_left(),
                1 => editor.align_center(),
                _ => editor.align_right(),
            },
            Command::List(ordered) => editor.insert_list(ordered),
            Command::Table(rows, cols) => {
                editor.insert_table(usize::from(rows % 8), usize::from(cols % 8));
            }
            Command::Link(url) => editor.create_link(&url),
            Command::Image(url) => editor.insert_image(&url),
            Command::Rule => editor.insert_horizontal_line(),
            Command::Replace(text) => editor.replace_selected_text(&text),
            Command::Html(html) => editor.insert_html(&html),
        }
        let doc = editor.document();
        assert_eq!(doc.clamp(editor.selection().head), editor.selection().head);
    }
    let _ = Editor::with_content(&editor.content());
});
