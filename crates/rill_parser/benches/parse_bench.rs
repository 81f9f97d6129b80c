use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rill_parser::parse;

// A medium-size rill source with various constructs
const RILL_SOURCE: &str = r#"
record Point(x: Int, y: Int)
record Rect(origin: Point, width: Int, height: Int)

fun (Point).manhattan(): Int {
    return self.x + self.y
}

fun (Rect).area(): Int {
    return self.width * self.height
}

fun clamp(value: Int, low: Int, high: Int): Int {
    if (value < low) {
        return low
    }
    if (value > high) {
        return high
    }
    return value
}

fun sum(values: Int[]): Int {
    let total = 0
    let i = 0
    while (i < len(values)) {
        total = total + values[i]
        i = i + 1
    }
    return total
}

fun describe(value: Int | None): String {
    return value == none ? "missing" : "present"
}

let points = [new Point(1, 2), new Point(3, 4), new Point(5, 6)]
let lookup = {"a": 1, "b": 2, "c": 3}
let tags = {"x", "y", "z"}
let pair = (1, "one")

let makeAdder = fun (base: Int): (Int) -> Int {
    return fun (value: Int): Int {
        return base + value
    }
}

def addTen = makeAdder(10)
let i = 0
do {
    defer println(i)
    i = i + 1
} while (i < 3)

let parsed = "42".int()
let scaled = try (100 / parsed as Int)
println(addTen(sum([1, 2, 3])))
println(describe(parsed))
"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_medium_source", |b| {
        b.iter(|| {
            let (program, diagnostics) = parse(black_box(RILL_SOURCE));
            black_box((program, diagnostics));
        })
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
