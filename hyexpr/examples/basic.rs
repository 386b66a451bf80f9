use std::io::Write;

use clap::Parser;
use hyexpr::prelude::*;
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Build a few symbolic expressions, bind their variables
/// and print them before and after simplification
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Value bound to `x` (left free if omitted)
    #[arg(short, long)]
    pub x: Option<i64>,

    /// Value bound to `y` (left free if omitted)
    #[arg(short, long)]
    pub y: Option<i64>,

    /// Rendering width (defaults to the terminal width)
    #[arg(short, long)]
    pub width: Option<usize>,
}

fn main() {
    let args = Args::parse();

    let x = Variable::new("x").expect("`x` is the first variable");
    let y = Variable::new("y").expect("`y` is the second variable");

    let func = ExternalFn::new("func", |call| {
        let mut total = 0i64;
        for value in call.positional().iter().chain(call.named("d")) {
            match value {
                Value::Int(v) => {
                    total = total
                        .checked_add(*v)
                        .ok_or(EvalError::OutOfRange { symbol: "func" })?
                }
                other => return Err(EvalError::Custom(format!("func: `{other}` is not an integer"))),
            }
        }
        Ok(total.into())
    });

    let exprs = [
        (&x + &y + 5 + 6).pow(5),
        &x + 3,
        func.invoke()
            .arg(&x)
            .arg(&y)
            .arg(1)
            .kwarg("d", &x * 10)
            .build()
            .expect("`d` is given once"),
        x.floor_div(&y - 4),
    ];

    if let Some(v) = args.x {
        x.set_value(v);
    }
    if let Some(v) = args.y {
        y.set_value(v);
    }

    let mut header = ColorSpec::new();
    header.set_fg(Some(termcolor::Color::Green));
    header.set_intense(true);

    let stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut stdout = stdout.lock();
    for expr in &exprs {
        let folded = expr.simplify();

        stdout.set_color(&header).unwrap();
        write!(stdout, "{:>12}: ", "expression").unwrap();
        stdout.reset().unwrap();
        print_expr(expr, args.width, &mut stdout);

        stdout.set_color(&header).unwrap();
        write!(stdout, "{:>12}: ", format!("{:?}", folded.kind()).to_lowercase()).unwrap();
        stdout.reset().unwrap();
        print_expr(&folded, args.width, &mut stdout);

        let mut free: Vec<String> = expr.free_variables().iter().map(Variable::name).collect();
        free.sort();
        writeln!(stdout, "{:>12}: {}", "free", free.join(", ")).unwrap();
        writeln!(stdout).unwrap();
    }
}

fn print_expr<W: WriteColor + Write>(expr: &Expression, width: Option<usize>, out: &mut W) {
    let width = width.unwrap_or_else(|| term_size::dimensions().map(|(w, _)| w).unwrap_or(80));
    expr.pretty_render_to(width, out).unwrap();
    writeln!(out).unwrap();
}
