mod relocation;

pub(in crate::world) use relocation::similar_neighbours;
