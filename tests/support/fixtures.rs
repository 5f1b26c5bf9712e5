//! Concept sources shared by the integration tests.

pub const TEAM_SPEC: &str = r#"concept Team

purpose
  group users so they can share work

state
  Teams
    name: String
    owner: User

actions
  create (name: String, owner: User) : {team: Team} | {error: String}
    - creates a team owned by owner
  delete (team: Team) : {} | {error: String}

queries
  _getByOwner (owner: User) : (team: Team)[]

operational principle
  after create, the team is returned by _getByOwner
"#;

const TEAM_HEADER: &str = r#"import { Collection, Db } from "npm:mongodb";
import { Empty, ID } from "@utils/types.ts";
import { freshID } from "@utils/database.ts";

const PREFIX = "Team" + ".";

interface TeamDoc {
  _id: ID;
  name: string;
  owner: ID;
}

export default class TeamConcept {
  teams: Collection<TeamDoc>;

  constructor(private readonly db: Db) {
    this.teams = this.db.collection(PREFIX + "teams");
  }
"#;

const TEAM_CREATE: &str = r#"
  async create(
    { name, owner }: { name: string; owner: ID },
  ): Promise<{ team: ID } | { error: string }> {
    if (await this.teams.findOne({ name })) {
      return { error: `Team ${name} already exists` };
    }
    const team = freshID();
    await this.teams.insertOne({ _id: team, name, owner });
    return { team };
  }
"#;

const TEAM_DELETE: &str = r#"
  async delete({ team }: { team: ID }): Promise<Empty | { error: string }> {
    const result = await this.teams.deleteOne({ _id: team });
    if (result.deletedCount === 0) {
      return { error: "No such team" };
    }
    return {};
  }
"#;

const TEAM_QUERY: &str = r#"
  async _getByOwner({ owner }: { owner: ID }): Promise<TeamDoc[]> {
    return await this.teams.find({ owner }).toArray();
  }
"#;

/// An implementation that realizes `TEAM_SPEC` exactly.
pub fn team_impl() -> String {
    format!("{}{}{}{}}}\n", TEAM_HEADER, TEAM_CREATE, TEAM_DELETE, TEAM_QUERY)
}

/// `TEAM_SPEC`'s implementation without the `delete` action.
pub fn team_impl_without_delete() -> String {
    format!("{}{}{}}}\n", TEAM_HEADER, TEAM_CREATE, TEAM_QUERY)
}

pub const ROSTER_SPEC: &str = r#"concept Roster
purpose
  track which members are currently active
state
  Members
    member: User
    active: Flag
actions
  join (member: User) : {} | {error: String}
queries
  _getActive () : (member: User)[]
"#;

/// Roster implementation whose query lacks the query marker.
pub const ROSTER_IMPL: &str = r#"import { Collection, Db } from "npm:mongodb";
import { Empty, ID } from "@utils/types.ts";

export default class RosterConcept {
  members: Collection<{ _id: ID; active: boolean }>;

  constructor(private readonly db: Db) {
    this.members = this.db.collection("Roster.members");
  }

  async join({ member }: { member: ID }): Promise<Empty | { error: string }> {
    await this.members.insertOne({ _id: member, active: true });
    return {};
  }

  async getActive(): Promise<ID[]> {
    const docs = await this.members.find({ active: true }).toArray();
    return docs.map((d) => d._id);
  }
}
"#;

/// A spec with no implementation anywhere.
pub const AUDIT_SPEC: &str = r#"concept Audit
purpose
  record who changed what
state
  Entries
    actor: User
actions
  record (actor: User, change: String) : {entry: Entry} | {error: String}
"#;

/// An implementation with no specification.
pub const ORPHAN_IMPL: &str = r#"export default class LabelConcept {
  async add({ label }: { label: string }): Promise<{ error: string } | {}> {
    return {};
  }
}
"#;
