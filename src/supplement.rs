//! Built-in question set for the prescribed literature text.
//!
//! English papers in exam mode are padded with questions on the prescribed
//! novel, which the upstream question bank does not cover. Ids are stable
//! ("lh-exam-N") so that repeated merges dedup cleanly against cached and
//! persisted copies.

use serde_json::json;

use crate::models::Question;

const TOPIC: &str = "Literature - The Lekki Headmaster";

/// Number of supplement questions appended to an English exam paper
pub const EXAM_SUPPLEMENT_COUNT: usize = 15;

struct Item {
    question: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
    explanation: &'static str,
}

const ITEMS: [Item; 15] = [
    Item {
        question: "Who wrote the novel The Lekki Headmaster?",
        options: ["Wole Soyinka", "Kabir Alabi Garba", "Chinua Achebe", "Buchi Emecheta"],
        answer: "b",
        explanation: "The Lekki Headmaster was written by Kabir Alabi Garba.",
    },
    Item {
        question: "The Lekki Headmaster is primarily set in which Nigerian city?",
        options: ["Abuja", "Ibadan", "Lagos", "Port Harcourt"],
        answer: "c",
        explanation: "The novel is set in Lekki, a district of Lagos.",
    },
    Item {
        question: "The central character of The Lekki Headmaster works as a",
        options: ["school administrator", "market trader", "journalist", "fisherman"],
        answer: "a",
        explanation: "The protagonist heads a school, hence the title of the novel.",
    },
    Item {
        question: "Which of the following is a major theme of The Lekki Headmaster?",
        options: ["Deep-sea exploration", "The state of education", "Space travel", "Desert warfare"],
        answer: "b",
        explanation: "The novel is preoccupied with schooling and the burden of educational reform.",
    },
    Item {
        question: "The Lekki Headmaster belongs to which literary genre?",
        options: ["Epic poetry", "Drama", "Prose fiction", "Folktale anthology"],
        answer: "c",
        explanation: "It is a prose novel.",
    },
    Item {
        question: "The conflict in The Lekki Headmaster chiefly arises from the clash between",
        options: [
            "old and new approaches to schooling",
            "two rival football clubs",
            "farmers and herders",
            "sailors and dock workers",
        ],
        answer: "a",
        explanation: "Tension in the novel turns on resistance to change within the school system.",
    },
    Item {
        question: "In The Lekki Headmaster, the school community is portrayed as",
        options: [
            "entirely free of problems",
            "a microcosm of the wider society",
            "cut off from the outside world",
            "irrelevant to the plot",
        ],
        answer: "b",
        explanation: "The school's struggles mirror those of the society around it.",
    },
    Item {
        question: "The narrative voice of The Lekki Headmaster can best be described as",
        options: ["detached and reportorial", "engaged and reflective", "hysterical", "wholly unreliable"],
        answer: "b",
        explanation: "The narration stays close to the protagonist's reflections on his vocation.",
    },
    Item {
        question: "A recurring concern of the headmaster in the novel is",
        options: [
            "the welfare and discipline of his pupils",
            "winning a national lottery",
            "emigrating to Europe",
            "buying a fishing trawler",
        ],
        answer: "a",
        explanation: "His pupils' progress and conduct sit at the heart of his worries.",
    },
    Item {
        question: "The novel's treatment of parents and guardians shows them as",
        options: [
            "uniformly hostile to education",
            "varied in their commitment to their children's schooling",
            "absent from the story",
            "all wealthy patrons",
        ],
        answer: "b",
        explanation: "Parents in the novel range from devoted to indifferent.",
    },
    Item {
        question: "Which institution is most central to the action of The Lekki Headmaster?",
        options: ["A hospital", "A courtroom", "A school", "A shipping port"],
        answer: "c",
        explanation: "Nearly all the action radiates from the school the headmaster runs.",
    },
    Item {
        question: "The Lekki Headmaster reflects contemporary Nigerian life most strongly through its",
        options: [
            "use of present-day settings and concerns",
            "account of pre-colonial kingdoms",
            "focus on classical mythology",
            "setting aboard a spacecraft",
        ],
        answer: "a",
        explanation: "The novel is a contemporary work rooted in present-day Lagos.",
    },
    Item {
        question: "In the novel, the headmaster's attitude to his profession is best described as",
        options: ["dismissive", "mercenary", "dedicated", "fearful"],
        answer: "c",
        explanation: "He treats teaching and school leadership as a calling.",
    },
    Item {
        question: "The language of The Lekki Headmaster is notable for its",
        options: [
            "blend of standard English with local colour",
            "exclusive use of Latin",
            "absence of dialogue",
            "reliance on legal jargon",
        ],
        answer: "a",
        explanation: "The prose mixes standard English with distinctly Nigerian expression.",
    },
    Item {
        question: "As prescribed reading, The Lekki Headmaster is examined under which paper?",
        options: ["Use of English", "Physics", "Geography", "Commerce"],
        answer: "a",
        explanation: "The prescribed novel is tested in the Use of English paper.",
    },
];

/// Returns up to `count` supplement questions with stable ids
pub fn english_exam_questions(count: usize) -> Vec<Question> {
    ITEMS
        .iter()
        .take(count)
        .enumerate()
        .map(|(index, item)| {
            Question::new_with_id(
                format!("lh-exam-{}", index),
                "english".to_string(),
                Some(TOPIC.to_string()),
                item.question.to_string(),
                json!({
                    "a": item.options[0],
                    "b": item.options[1],
                    "c": item.options[2],
                    "d": item.options[3],
                }),
                item.answer.to_string(),
                Some(item.explanation.to_string()),
                "utme".to_string(),
                Some("2024".to_string()),
            )
        })
        .collect()
}
