use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::IndexMap;

/// Character grid with a legend for the characters.
///
/// Can be deserialized from an IDM outline where the legend is given as an
/// attribute and the map data follows as the unindented body:
///
/// ```notrust
/// :legend
///   # wall
///   . floor
/// #####
/// #...#
/// #####
/// ```
#[derive(Clone, Default, Debug, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AsciiMap<T> {
    map: String,
    legend: IndexMap<char, T>,
}

impl<T> AsciiMap<T> {
    pub fn new(map: &str, legend: IndexMap<char, T>) -> Self {
        AsciiMap {
            map: dedent(map),
            legend,
        }
    }

    /// Size of the bounding rectangle of the map text.
    pub fn dim(&self) -> IVec2 {
        let h = self.map.lines().count();
        let w = self
            .map
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        ivec2(w as i32, h as i32)
    }

    pub fn legend(&self) -> &IndexMap<char, T> {
        &self.legend
    }

    /// Iterate the points and legend entries (if present) on the map.
    ///
    /// Whitespace is treated as empty space and skipped.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, char, Option<&T>)> + '_ {
        self.map.lines().enumerate().flat_map(move |(y, line)| {
            line.chars()
                .enumerate()
                .filter(|(_, c)| !c.is_whitespace())
                .map(move |(x, c)| {
                    (ivec2(x as i32, y as i32), c, self.legend.get(&c))
                })
        })
    }
}

/// Strip leading blank lines, trailing whitespace and the common
/// indentation of the remaining lines.
fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end())
        .skip_while(|line| line.is_empty())
        .collect();

    let indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut ret = String::new();
    for line in lines {
        ret.extend(line.chars().skip(indent));
        ret.push('\n');
    }
    ret.truncate(ret.trim_end().len());
    ret
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AsciiMap<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ((attrs,), body) =
            <((SerAsciiMap<T>,), String)>::deserialize(deserializer)?;

        // The map can be either in the attribute block or in the body.
        let map = if attrs.map.trim().is_empty() {
            body
        } else {
            attrs.map
        };
        Ok(AsciiMap::new(&map, attrs.legend))
    }
}

#[derive(Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct SerAsciiMap<T> {
    map: String,
    legend: IndexMap<char, T>,
}

// XXX: derive(Default) would require T: Default.
impl<T> Default for SerAsciiMap<T> {
    fn default() -> Self {
        SerAsciiMap {
            map: Default::default(),
            legend: Default::default(),
        }
    }
}
