use xcontrol_language_server::parser::lex;
use xcontrol_language_server::{parse, validate, DiagnosticConfig, Schema};

fn main() {
    println!("=== xcontrol Parser Demo ===");

    let text = "# demo input
$chrg 0
$fix
   atoms: 1-5 # frozen
$end
stray: 1
$wall
   potential: logfermi
   temp=300
   temp=350
";

    for token in lex(text) {
        println!("{:>3}: {:?}", token.line, token.kind);
    }

    let schema = Schema::builtin();
    let document = parse(text, schema);
    println!("\nInstructions:");
    for inst in &document.instructions {
        println!(
            "  {} ({}) lines {}..={} options={} explicit_end={}",
            inst.name,
            inst.kind.as_str(),
            inst.body_start_line,
            inst.last_line(),
            inst.options.len(),
            inst.has_explicit_end
        );
    }

    println!("\nDiagnostics:");
    for diagnostic in validate(&document, schema, &DiagnosticConfig::default()) {
        println!(
            "  {}:{} {} [{}] {}",
            diagnostic.range.start.line + 1,
            diagnostic.range.start.character + 1,
            diagnostic.severity,
            diagnostic.code(),
            diagnostic.message
        );
    }
}
