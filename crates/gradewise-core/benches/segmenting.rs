use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradewise_core::model::{AnswerType, Question};
use gradewise_core::segmenter::{segment, segment_lines};

fn questions(n: usize) -> Vec<Question> {
    (1..=n)
        .map(|i| Question {
            id: format!("q{i}"),
            answer_type: AnswerType::ShortAnswer,
            correct_answer: "answer".into(),
            topic: "bench".into(),
            prompt: None,
        })
        .collect()
}

fn numbered_sheet(n: usize) -> String {
    (1..=n)
        .map(|i| format!("{i}. the answer to question {i} is 3.5 units\n"))
        .collect()
}

fn mixed_sheet(n: usize) -> String {
    (1..=n)
        .map(|i| match i % 3 {
            0 => format!("Question {i}: osmosis moves water\n"),
            1 => format!("Q{i} - x = {i}\n"),
            _ => format!("{i}) chlorophyll\n"),
        })
        .collect()
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    for n in [10, 50] {
        let qs = questions(n);
        let numbered = numbered_sheet(n);
        let mixed = mixed_sheet(n);

        group.bench_function(format!("numbered/{n}"), |b| {
            b.iter(|| segment(black_box(&numbered), black_box(&qs)))
        });
        group.bench_function(format!("mixed/{n}"), |b| {
            b.iter(|| segment(black_box(&mixed), black_box(&qs)))
        });
        group.bench_function(format!("lines/{n}"), |b| {
            b.iter(|| segment_lines(black_box(&numbered), black_box(&qs)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_segment);
criterion_main!(benches);
