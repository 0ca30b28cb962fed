use crate::generation::generation_from_id;
use crate::models::SpeciesBasic;

/// Name, type and generation predicates over already-loaded records.
/// Empty filters match everything; the result keeps the input order.
pub fn filter<'a>(
    items: &'a [SpeciesBasic],
    query: &str,
    type_filter: &str,
    gen_filter: &str,
) -> Vec<&'a SpeciesBasic> {
    filter_indices(items, query, type_filter, gen_filter)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

/// Same as [`filter`], returning positions into `items`.
pub fn filter_indices(
    items: &[SpeciesBasic],
    query: &str,
    type_filter: &str,
    gen_filter: &str,
) -> Vec<usize> {
    let q = query.trim().to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, p)| q.is_empty() || p.name.to_lowercase().contains(&q))
        .filter(|(_, p)| type_filter.is_empty() || p.has_type(type_filter))
        .filter(|(_, p)| gen_filter.is_empty() || generation_from_id(p.id) == gen_filter)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TypeSlot;

    fn basic(id: u32, name: &str, types: &[&str]) -> SpeciesBasic {
        SpeciesBasic {
            id,
            name: name.to_string(),
            sprite_url: String::new(),
            types: types
                .iter()
                .enumerate()
                .map(|(i, t)| TypeSlot {
                    slot: i as u32 + 1,
                    type_name: t.to_string(),
                })
                .collect(),
        }
    }

    fn sample() -> Vec<SpeciesBasic> {
        vec![
            basic(1, "bulbasaur", &["grass", "poison"]),
            basic(4, "charmander", &["fire"]),
            basic(5, "charmeleon", &["fire"]),
            basic(155, "cyndaquil", &["fire"]),
            basic(152, "chikorita", &["grass"]),
        ]
    }

    #[test]
    fn empty_filters_return_everything_in_order() {
        let items = sample();
        let out = filter(&items, "", "", "");
        assert_eq!(out.len(), items.len());
        assert!(out.iter().zip(items.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn name_query_is_case_insensitive_substring() {
        let items = vec![basic(1, "bulbasaur", &["grass", "poison"]), basic(4, "charmander", &["fire"])];
        let out = filter(&items, "char", "", "");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 4);

        assert_eq!(filter(&items, "CHAR", "", "").len(), 1);
    }

    #[test]
    fn type_match_is_exact() {
        let items = sample();
        let ids: Vec<u32> = filter(&items, "", "fire", "").iter().map(|p| p.id).collect();
        assert_eq!(ids, [4, 5, 155]);
        assert!(filter(&items, "", "fir", "").is_empty());
    }

    #[test]
    fn predicates_combine() {
        let items = sample();
        let ids: Vec<u32> = filter(&items, "", "fire", "generation-ii").iter().map(|p| p.id).collect();
        assert_eq!(ids, [155]);

        let ids: Vec<u32> = filter(&items, "ch", "grass", "generation-ii").iter().map(|p| p.id).collect();
        assert_eq!(ids, [152]);

        assert!(filter(&items, "bulba", "fire", "").is_empty());
    }

    #[test]
    fn indices_point_into_input() {
        let items = sample();
        assert_eq!(filter_indices(&items, "char", "", ""), [1, 2]);
    }
}
