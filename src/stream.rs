/// A stream is the category tag every generated job hangs off of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stream {
    /// short id used as the job's stream_id column
    pub id: &'static str,
    /// display name used to build titles
    pub name: &'static str,
}

/// jobs generated per stream, numbered 1..=JOBS_PER_STREAM
pub const JOBS_PER_STREAM: usize = 25;

// order matters - it decides the id ranges of every stream
pub const STREAMS: [Stream; 7] = [
    Stream { id: "agriculture", name: "Agriculture" },
    Stream { id: "arts", name: "Arts and Humanities" },
    Stream { id: "commerce", name: "Commerce" },
    Stream { id: "fine_arts", name: "Fine Arts" },
    Stream { id: "health", name: "Health and Life Sciences" },
    Stream { id: "technical", name: "Technical" },
    Stream { id: "uniformed", name: "Uniformed Services" },
];

pub const TOTAL_JOBS: usize = STREAMS.len() * JOBS_PER_STREAM;

impl Stream {
    /// Inclusive range of job ids this stream receives in a full run.
    pub fn id_range(&self) -> Option<(usize, usize)> {
        let pos = STREAMS.iter().position(|s| s.id == self.id)?;
        let first = pos * JOBS_PER_STREAM + 1;
        Some((first, first + JOBS_PER_STREAM - 1))
    }
}

#[test]
fn test_stream_id_ranges() {
    assert_eq!(TOTAL_JOBS, 175);
    assert_eq!(STREAMS[0].id_range(), Some((1, 25)));
    assert_eq!(STREAMS[1].id_range(), Some((26, 50)));
    assert_eq!(STREAMS[6].id_range(), Some((151, 175)));

    let stray = Stream { id: "nope", name: "Nope" };
    assert_eq!(stray.id_range(), None);
}
