/*!

This is the long-form manual for `ranked_pairs` and `tideman`.

## The method

1. Every ballot ranks all the candidates. For each pair of candidates `(a, b)`,
   count the ballots that rank `a` above `b`.
2. `a` wins the pair against `b` when more ballots prefer `a` to `b` than the
   opposite. The margin of the victory is the difference. Pairs with equal counts
   are dropped.
3. Victories are sorted from the largest margin to the smallest. Victories with
   the same margin stay in candidate order: the candidates listed first come first.
4. Victories are locked one by one into a graph of candidates. A victory of `a`
   over `b` is skipped if `b` can already reach `a` through the locked victories,
   since locking it would create a cycle.
5. The winner is the only candidate over whom no victory is locked.

If several candidates are left undefeated because they tied each other, there is
no unique winner and `tideman` stops with an error.

## Running `tideman`

The simplest use passes the candidates on the command line and asks for the
ballots interactively:

```text
$ tideman Alice Bob Charlie
Number of voters: 2
Rank 1: Alice
Rank 2: Charlie
Rank 3: Bob

Rank 1: Alice
Rank 2: Bob
Rank 3: Charlie

Alice
```

A name that is not a candidate stops the program with an invalid vote error.

## Input formats

Ballots can also be read from a file with `--input`, or from the sources listed
in a configuration file.

### `csv`

Each row is a ballot, each column (in order) a rank.

```text
id,choice 1,choice 2,choice 3
b1,Alice,Bob,Charlie
b2,Charlie,Alice,Bob
```

The `id` column and the header row are optional. See the
[Configuration section](#configuration) to select them.

### `xlsx`

Excel spreadsheets, with the same layout as the CSV files. The first worksheet is
used unless `excelWorksheetName` (or `--excel-worksheet-name`) says otherwise.

## Configuration

`tideman` accepts a configuration file in JSON with `--config`:

```text
{
  "outputSettings": { "contestName": "Board election" },
  "ballotSources": [
    { "provider": "csv", "filePath": "ballots.csv",
      "firstVoteColumnIndex": 2, "firstVoteRowIndex": 2, "idColumnIndex": 1 }
  ],
  "candidates": [ { "name": "Alice" }, { "name": "Bob" }, { "name": "Charlie" } ],
  "rules": { "maxCandidates": 9 }
}
```

 - `firstVoteColumnIndex` (number or string, default 1): the first column with a rank.
 - `firstVoteRowIndex` (number or string, default 1): the first row with a ballot.
 - `idColumnIndex` (number or string, optional): the column with the ballot ids.
   If not provided, ballots are named after the file and the line.
 - `excelWorksheetName` (string, optional): for Excel inputs, the name of
   the worksheet.

All the indices start at 1. The file paths are relative to the configuration file.

`maxCandidates` defaults to 9. An election with more candidates is refused before
reading any ballot.

## Output

With `--out`, a summary of the election is written in JSON: the preference counts,
all the pairwise victories in the order they were considered with a flag telling
whether they were locked, and the winner. `--reference` compares this summary with
an expected one and fails if they differ.

## Exit codes

| code | meaning                                |
|------|----------------------------------------|
| 0    | success                                |
| 1    | usage error                            |
| 2    | too many candidates                    |
| 3    | invalid ballot                         |
| 4    | no unique winner                       |
| 5    | internal error in the locking procedure|
| 6    | input, output or configuration error   |

 */
